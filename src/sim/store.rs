use crate::foundation::error::SmokeResult;
use crate::render::raster::{ParticleLook, ParticleRaster};
use crate::render::surface::Surface;
use crate::sim::particle::Particle;

/// Ordered collection of live particles, oldest first.
#[derive(Clone, Debug)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    max_particles: usize,
    evicted_total: u64,
}

impl Default for ParticleStore {
    fn default() -> Self {
        Self::with_capacity_limit(5000)
    }
}

impl ParticleStore {
    pub fn with_capacity_limit(max_particles: usize) -> Self {
        Self {
            particles: Vec::new(),
            max_particles: max_particles.max(1),
            evicted_total: 0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    /// Total particles dropped by the capacity limit since creation.
    pub fn evicted_total(&self) -> u64 {
        self.evicted_total
    }

    /// Change the capacity limit, evicting the oldest particles if the store is over it.
    pub fn set_max_particles(&mut self, max_particles: usize) -> usize {
        self.max_particles = max_particles.max(1);
        self.evict_overflow()
    }

    /// Append particles in order. Returns how many of the oldest were evicted to stay within the
    /// capacity limit.
    pub fn add(&mut self, particles: impl IntoIterator<Item = Particle>) -> usize {
        self.particles.extend(particles);
        self.evict_overflow()
    }

    /// Advance every particle by `dt` seconds, then drop expired ones.
    ///
    /// Returns the number removed. A `dt` that is not finite and positive is a no-op.
    pub fn update(&mut self, dt: f64) -> usize {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        for p in &mut self.particles {
            p.advance(dt);
        }
        let before = self.particles.len();
        self.particles.retain(Particle::is_alive);
        before - self.particles.len()
    }

    /// Paint every particle over `layer`. Does not mutate the store.
    pub fn draw(
        &self,
        raster: &mut ParticleRaster,
        look: &ParticleLook,
        layer: &mut Surface,
    ) -> SmokeResult<usize> {
        raster.draw(&self.particles, look, layer)
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    fn evict_overflow(&mut self) -> usize {
        let excess = self.particles.len().saturating_sub(self.max_particles);
        if excess > 0 {
            self.particles.drain(..excess);
            self.evicted_total += excess as u64;
            tracing::trace!(excess, "evicted oldest particles");
        }
        excess
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sim/store.rs"]
mod tests;
