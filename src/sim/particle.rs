use crate::foundation::core::{Point, Vec2};

/// One live smoke particle.
///
/// Velocities are in logical pixels per second and times are in seconds. `scale` is the drawn
/// diameter in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub velocity: Vec2,
    pub start_velocity: Vec2,
    pub scale: f64,
    pub start_scale: f64,
    pub final_scale: f64,
    /// Seconds left before the particle expires.
    pub remaining: f64,
    /// Total lifetime in seconds (> 0).
    pub lifetime: f64,
}

impl Particle {
    pub fn new(origin: Point, velocity: Vec2, scale: f64, final_scale: f64, lifetime: f64) -> Self {
        Self {
            position: origin,
            velocity,
            start_velocity: velocity,
            scale,
            start_scale: scale,
            final_scale,
            remaining: lifetime,
            lifetime,
        }
    }

    pub fn age(&self) -> f64 {
        self.lifetime - self.remaining
    }

    /// Normalized age in [0, 1].
    pub fn age_ratio(&self) -> f64 {
        if self.lifetime <= 0.0 {
            1.0
        } else {
            (self.age() / self.lifetime).clamp(0.0, 1.0)
        }
    }

    /// Remaining over total lifetime, clamped to [0, 1].
    pub fn opacity(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.lifetime).clamp(0.0, 1.0) as f32
    }

    pub fn is_alive(&self) -> bool {
        self.remaining > 0.0
    }

    /// Advance by `dt` seconds. Callers guarantee `dt` is finite and positive.
    pub(crate) fn advance(&mut self, dt: f64) {
        self.position += self.velocity * dt;
        self.remaining = (self.remaining - dt).max(0.0);

        let t = self.age_ratio();
        // Velocity bleeds off with the square root of age so smoke slows as it spreads.
        self.velocity = self.start_velocity * (1.0 - t.sqrt());
        self.scale = self.start_scale + (self.final_scale - self.start_scale) * t;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sim/particle.rs"]
mod tests;
