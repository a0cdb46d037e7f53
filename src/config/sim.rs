use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Point, Rgb8, ValueRange};
use crate::foundation::error::{SmokeError, SmokeResult};

/// Uniform sampling ranges for newly spawned particles.
///
/// Velocities are in logical pixels per second, scale is the drawn diameter in pixels and
/// lifetime is in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRanges {
    pub vx: ValueRange,
    pub vy: ValueRange,
    pub scale: ValueRange,
    pub lifetime: ValueRange,
}

impl Default for SpawnRanges {
    fn default() -> Self {
        Self {
            vx: ValueRange::new(-40.0, 40.0),
            vy: ValueRange::new(-400.0, -100.0),
            scale: ValueRange::new(20.0, 40.0),
            lifetime: ValueRange::new(2.0, 8.0),
        }
    }
}

impl SpawnRanges {
    pub(crate) const MIN_LIFETIME: f64 = 1e-3;
    pub const MAX_LIFETIME: f64 = 3600.0;
    /// Largest speed on either axis, in px/s.
    pub const MAX_SPEED: f64 = 1e6;
    /// Largest particle diameter in pixels, also applied to the end-of-life scale.
    pub const MAX_SCALE: f64 = 4096.0;

    /// Swap inverted pairs and clamp to the domain of each attribute.
    ///
    /// Every bound is finite afterwards, so `max - min` never overflows.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let speed = |r: ValueRange, fb: ValueRange| {
            r.normalized_or(fb)
                .clamp_to(-Self::MAX_SPEED, Self::MAX_SPEED)
        };
        Self {
            vx: speed(self.vx, d.vx),
            vy: speed(self.vy, d.vy),
            scale: self
                .scale
                .normalized_or(d.scale)
                .clamp_to(0.0, Self::MAX_SCALE),
            lifetime: self
                .lifetime
                .normalized_or(d.lifetime)
                .clamp_to(Self::MIN_LIFETIME, Self::MAX_LIFETIME),
        }
    }
}

/// A persistent point source that emits every tick until its lifetime runs out.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub origin: Point,
    /// Particles emitted when the emitter is added and on every tick after that.
    pub count: u32,
    /// Seconds the emitter stays active; `None` keeps it forever.
    pub lifetime: Option<f64>,
    /// Overrides the configured spawn ranges for this emitter only.
    pub ranges: Option<SpawnRanges>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            origin: Point::new(100.0, 100.0),
            count: 10,
            lifetime: None,
            ranges: None,
        }
    }
}

impl EmitterConfig {
    pub fn at(origin: Point, count: u32) -> Self {
        Self {
            origin,
            count,
            ..Self::default()
        }
    }

    pub fn with_lifetime(mut self, lifetime: f64) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Non-positive or non-finite lifetimes mean "forever".
    pub fn sanitized(self) -> Self {
        Self {
            origin: self.origin,
            count: self.count,
            lifetime: self.lifetime.filter(|l| l.is_finite() && *l > 0.0),
            ranges: self.ranges.map(SpawnRanges::sanitized),
        }
    }
}

/// Parameters of the fractal noise used by [`SpriteShape::Cloud`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudParams {
    /// Noise lattice cell size in sprite pixels.
    pub noise_scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Exponent of the radial edge falloff.
    pub falloff: f64,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            noise_scale: 10.0,
            octaves: 1,
            persistence: 0.5,
            lacunarity: 2.0,
            falloff: 1.2,
        }
    }
}

impl CloudParams {
    fn sanitized(self) -> Self {
        let d = Self::default();
        let finite_pos = |v: f64, fb: f64| if v.is_finite() && v > 0.0 { v } else { fb };
        Self {
            noise_scale: finite_pos(self.noise_scale, d.noise_scale),
            octaves: self.octaves.clamp(1, 8),
            persistence: finite_pos(self.persistence, d.persistence),
            lacunarity: finite_pos(self.lacunarity, d.lacunarity),
            falloff: finite_pos(self.falloff, d.falloff),
        }
    }
}

/// How a single particle is painted on the effect layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpriteShape {
    /// Anti-aliased filled circle.
    Disc,
    /// Noise cloud sprite rendered at `sprite_size` and scaled to the particle.
    Cloud(CloudParams),
}

impl Default for SpriteShape {
    fn default() -> Self {
        Self::Cloud(CloudParams::default())
    }
}

/// Tunable simulation parameters.
///
/// Instances handed to the simulation are snapshots: UI code owns the mutable copy (see
/// [`crate::Controls`]) and passes a fresh value on every tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub color: Rgb8,
    /// Resolution in pixels of the generated sprite texture.
    pub sprite_size: u32,
    pub sprite: SpriteShape,
    /// Global multiplier on every particle's own opacity.
    pub particle_alpha: f32,
    /// Opacity of the effect layer when composited over the media frame.
    pub blend_opacity: f32,
    pub spawn: SpawnRanges,
    /// Target scale at end of life, as a factor of the initial scale.
    pub final_scale_factor: ValueRange,
    /// Particles spawned per tick by point spawn policies.
    pub particles_per_tick: u32,
    /// Hard cap on live particles; oldest are evicted first.
    pub max_particles: usize,
    pub seed: u64,
    /// Emitters installed whenever a machine is built from this configuration.
    pub emitters: Vec<EmitterConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            color: Rgb8::new(24, 46, 48),
            sprite_size: 20,
            sprite: SpriteShape::default(),
            particle_alpha: 1.0,
            blend_opacity: 1.0,
            spawn: SpawnRanges::default(),
            final_scale_factor: ValueRange::new(0.01, 1.5),
            particles_per_tick: 10,
            max_particles: 5000,
            seed: 100,
            emitters: Vec::new(),
        }
    }
}

impl SimulationConfig {
    pub const MAX_SPRITE_SIZE: u32 = 512;
    pub const MAX_FINAL_SCALE_FACTOR: f64 = 16.0;

    /// Returns a copy satisfying every invariant (ordered ranges, clamped opacities, bounded
    /// sizes). Invalid values are repaired, never rejected.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let unit = |v: f32, fb: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { fb };
        Self {
            color: self.color,
            sprite_size: self.sprite_size.clamp(1, Self::MAX_SPRITE_SIZE),
            sprite: match self.sprite {
                SpriteShape::Disc => SpriteShape::Disc,
                SpriteShape::Cloud(p) => SpriteShape::Cloud(p.sanitized()),
            },
            particle_alpha: unit(self.particle_alpha, d.particle_alpha),
            blend_opacity: unit(self.blend_opacity, d.blend_opacity),
            spawn: self.spawn.sanitized(),
            final_scale_factor: self
                .final_scale_factor
                .normalized_or(d.final_scale_factor)
                .clamp_to(0.0, Self::MAX_FINAL_SCALE_FACTOR),
            particles_per_tick: self.particles_per_tick,
            max_particles: self.max_particles.max(1),
            seed: self.seed,
            emitters: self
                .emitters
                .iter()
                .map(|e| e.sanitized())
                .filter(|e| e.origin.is_finite())
                .collect(),
        }
    }

    pub fn from_json_str(s: &str) -> SmokeResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| SmokeError::serde(format!("parse simulation config: {e}")))?;
        Ok(cfg.sanitized())
    }

    pub fn load(path: &Path) -> SmokeResult<Self> {
        use anyhow::Context as _;
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read simulation config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/sim.rs"]
mod tests;
