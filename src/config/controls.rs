use std::str::FromStr;

use crate::config::sim::SimulationConfig;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{SmokeError, SmokeResult};

/// Read side of the configuration, handed to the per-frame driver.
pub trait ConfigSource {
    /// Current sanitized configuration.
    fn snapshot(&self) -> SimulationConfig;

    /// Bumped whenever a change requires restarting the particle set.
    fn generation(&self) -> u64;
}

impl ConfigSource for SimulationConfig {
    fn snapshot(&self) -> SimulationConfig {
        self.sanitized()
    }

    fn generation(&self) -> u64 {
        0
    }
}

/// One tunable control, named the way the control panel names its inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Color,
    MinLife,
    MaxLife,
    MinVx,
    MaxVx,
    MinVy,
    MaxVy,
    MinScale,
    MaxScale,
    SpriteSize,
    ParticleCount,
    /// Blend opacity in percent (0..=100).
    Opacity,
    /// Per-particle alpha multiplier in percent (0..=100).
    ParticleAlpha,
}

impl Control {
    pub const ALL: [Control; 13] = [
        Control::Color,
        Control::MinLife,
        Control::MaxLife,
        Control::MinVx,
        Control::MaxVx,
        Control::MinVy,
        Control::MaxVy,
        Control::MinScale,
        Control::MaxScale,
        Control::SpriteSize,
        Control::ParticleCount,
        Control::Opacity,
        Control::ParticleAlpha,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Control::Color => "color",
            Control::MinLife => "min-life",
            Control::MaxLife => "max-life",
            Control::MinVx => "min-vx",
            Control::MaxVx => "max-vx",
            Control::MinVy => "min-vy",
            Control::MaxVy => "max-vy",
            Control::MinScale => "min-scale",
            Control::MaxScale => "max-scale",
            Control::SpriteSize => "sprite-size",
            Control::ParticleCount => "particle-count",
            Control::Opacity => "opacity",
            Control::ParticleAlpha => "particle-alpha",
        }
    }

    /// Whether changing this control restarts the particle set.
    ///
    /// Blend opacity only affects compositing, so live particles survive it.
    pub fn resets_particles(self) -> bool {
        !matches!(self, Control::Opacity)
    }
}

impl FromStr for Control {
    type Err = SmokeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Control::ALL
            .into_iter()
            .find(|c| c.name() == key)
            .ok_or_else(|| SmokeError::validation(format!("unknown control '{s}'")))
    }
}

/// Mutable control panel state. Owns the configuration; the simulation only sees snapshots.
#[derive(Clone, Debug, Default)]
pub struct Controls {
    config: SimulationConfig,
    generation: u64,
}

impl Controls {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config: config.sanitized(),
            generation: 0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Apply a raw control value. Returns `false` if the value was unusable and ignored.
    pub fn set(&mut self, control: Control, raw: &str) -> bool {
        let applied = match control {
            Control::Color => match Rgb8::from_hex(raw) {
                Ok(c) => {
                    self.config.color = c;
                    true
                }
                Err(e) => {
                    tracing::warn!(control = control.name(), value = raw, "ignored: {e}");
                    false
                }
            },
            _ => match parse_number(raw) {
                Some(v) => {
                    self.apply_number(control, v);
                    true
                }
                None => {
                    tracing::warn!(
                        control = control.name(),
                        value = raw,
                        "ignored non-numeric control value"
                    );
                    false
                }
            },
        };

        if applied {
            self.config = self.config.sanitized();
            if control.resets_particles() {
                self.generation = self.generation.wrapping_add(1);
            }
        }
        applied
    }

    /// Like [`Controls::set`], resolving the control by name. Unknown names are an error.
    pub fn set_by_name(&mut self, name: &str, raw: &str) -> SmokeResult<bool> {
        let control = name.parse::<Control>()?;
        Ok(self.set(control, raw))
    }

    fn apply_number(&mut self, control: Control, v: f64) {
        let spawn = &mut self.config.spawn;
        match control {
            Control::Color => {}
            Control::MinLife => spawn.lifetime.min = v,
            Control::MaxLife => spawn.lifetime.max = v,
            Control::MinVx => spawn.vx.min = v,
            Control::MaxVx => spawn.vx.max = v,
            Control::MinVy => spawn.vy.min = v,
            Control::MaxVy => spawn.vy.max = v,
            Control::MinScale => spawn.scale.min = v,
            Control::MaxScale => spawn.scale.max = v,
            Control::SpriteSize => self.config.sprite_size = clamp_to_u32(v),
            Control::ParticleCount => self.config.particles_per_tick = clamp_to_u32(v),
            Control::Opacity => self.config.blend_opacity = (v / 100.0) as f32,
            Control::ParticleAlpha => self.config.particle_alpha = (v / 100.0) as f32,
        }
    }
}

impl ConfigSource for Controls {
    fn snapshot(&self) -> SimulationConfig {
        self.config.clone()
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn clamp_to_u32(v: f64) -> u32 {
    v.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/config/controls.rs"]
mod tests;
