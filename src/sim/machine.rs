use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::sim::{EmitterConfig, SimulationConfig, SpawnRanges};
use crate::foundation::core::{Point, ValueRange, Vec2};
use crate::foundation::error::SmokeResult;
use crate::render::raster::{ParticleLook, ParticleRaster};
use crate::render::surface::Surface;
use crate::sim::particle::Particle;
use crate::sim::store::ParticleStore;

/// A batch of particles to emit at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    pub origin: Point,
    pub count: u32,
    /// Overrides the machine's configured ranges when set.
    pub ranges: Option<SpawnRanges>,
}

/// Collects what a [`SpawnPolicy::Custom`] callback wants done this tick.
#[derive(Debug, Default)]
pub struct SpawnSink {
    requests: Vec<SpawnRequest>,
    clear: bool,
}

impl SpawnSink {
    pub fn spawn(&mut self, origin: Point, count: u32) {
        self.requests.push(SpawnRequest {
            origin,
            count,
            ranges: None,
        });
    }

    pub fn spawn_with(&mut self, origin: Point, count: u32, ranges: SpawnRanges) {
        self.requests.push(SpawnRequest {
            origin,
            count,
            ranges: Some(ranges),
        });
    }

    /// Empty the store before any of this tick's spawns are applied.
    pub fn clear(&mut self) {
        self.clear = true;
    }

    pub fn requests(&self) -> &[SpawnRequest] {
        &self.requests
    }
}

type CustomPolicy = Box<dyn FnMut(f64, &mut SpawnSink)>;

/// The pre-draw step run at the start of every tick. Exactly one is active at a time.
#[derive(Default)]
pub enum SpawnPolicy {
    #[default]
    Idle,
    /// Emit `count` particles at `origin` every tick.
    SpawnAtPoint { origin: Point, count: u32 },
    /// Empty the store and drop every emitter once, then revert to [`SpawnPolicy::Idle`].
    ForceClear,
    Custom(CustomPolicy),
}

impl SpawnPolicy {
    pub fn custom(f: impl FnMut(f64, &mut SpawnSink) + 'static) -> Self {
        Self::Custom(Box::new(f))
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl std::fmt::Debug for SpawnPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::SpawnAtPoint { origin, count } => f
                .debug_struct("SpawnAtPoint")
                .field("origin", origin)
                .field("count", count)
                .finish(),
            Self::ForceClear => f.write_str("ForceClear"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Identifies an [`Emitter`] for the lifetime of its machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmitterId(pub u64);

/// A point source that keeps emitting every tick, independent of the spawn policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emitter {
    pub id: EmitterId,
    pub origin: Point,
    pub count: u32,
    pub lifetime: Option<f64>,
    /// Seconds since the emitter was added.
    pub age: f64,
    pub ranges: Option<SpawnRanges>,
}

impl Emitter {
    pub fn is_expired(&self) -> bool {
        self.lifetime.is_some_and(|l| self.age > l)
    }
}

/// Counters for one [`SmokeMachine::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// False when the machine was stopped and the tick did nothing.
    pub ran: bool,
    pub spawned: usize,
    pub evicted: usize,
    pub expired: usize,
    pub drawn: usize,
    pub live: usize,
    /// Emitters removed this tick because their lifetime ran out.
    pub emitters_expired: usize,
    pub emitters: usize,
}

/// Owns the particle store, the active spawn policy and the seeded RNG.
///
/// A machine is built from one configuration snapshot and never re-reads it; a configuration
/// change is applied by building a new machine.
#[derive(Debug)]
pub struct SmokeMachine {
    store: ParticleStore,
    policy: SpawnPolicy,
    emitters: Vec<Emitter>,
    next_emitter_id: u64,
    rng: StdRng,
    raster: ParticleRaster,
    look: ParticleLook,
    ranges: SpawnRanges,
    final_scale_factor: ValueRange,
    running: bool,
}

impl SmokeMachine {
    pub fn new(cfg: &SimulationConfig) -> Self {
        let cfg = cfg.sanitized();
        let mut machine = Self {
            store: ParticleStore::with_capacity_limit(cfg.max_particles),
            policy: SpawnPolicy::Idle,
            emitters: Vec::new(),
            next_emitter_id: 0,
            rng: StdRng::seed_from_u64(cfg.seed),
            raster: ParticleRaster::new(),
            look: ParticleLook::from_config(&cfg),
            ranges: cfg.spawn,
            final_scale_factor: cfg.final_scale_factor,
            running: false,
        };
        for emitter in &cfg.emitters {
            machine.add_emitter(*emitter);
        }
        machine
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn look(&self) -> &ParticleLook {
        &self.look
    }

    pub fn ranges(&self) -> &SpawnRanges {
        &self.ranges
    }

    pub fn policy(&self) -> &SpawnPolicy {
        &self.policy
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    /// Add an emitter. It emits its first batch right away and then once per tick until its
    /// lifetime runs out.
    pub fn add_emitter(&mut self, cfg: EmitterConfig) -> EmitterId {
        let cfg = cfg.sanitized();
        let id = EmitterId(self.next_emitter_id);
        self.next_emitter_id += 1;

        let ranges = cfg.ranges.unwrap_or(self.ranges);
        let spawned = self.add_smoke(cfg.origin, cfg.count, &ranges);
        tracing::debug!(id = id.0, origin = ?cfg.origin, spawned, "emitter added");

        self.emitters.push(Emitter {
            id,
            origin: cfg.origin,
            count: cfg.count,
            lifetime: cfg.lifetime,
            age: 0.0,
            ranges: cfg.ranges,
        });
        id
    }

    /// Returns `false` when no emitter has this id.
    pub fn remove_emitter(&mut self, id: EmitterId) -> bool {
        let before = self.emitters.len();
        self.emitters.retain(|e| e.id != id);
        self.emitters.len() != before
    }

    /// Drop every emitter. Live particles are left to fade out.
    pub fn clear_emitters(&mut self) {
        self.emitters.clear();
    }

    /// Install `policy` as the single active pre-draw step and return the one it replaced.
    pub fn set_spawn_policy(&mut self, policy: SpawnPolicy) -> SpawnPolicy {
        tracing::debug!(?policy, "spawn policy replaced");
        std::mem::replace(&mut self.policy, policy)
    }

    /// Emit `count` particles at `origin`, sampling each attribute uniformly from `ranges`.
    ///
    /// Inverted ranges are swapped before sampling. Zero count or a non-finite origin does
    /// nothing. Returns how many particles were spawned; the oldest ones may be evicted to make
    /// room (see [`ParticleStore::evicted_total`]).
    pub fn add_smoke(&mut self, origin: Point, count: u32, ranges: &SpawnRanges) -> usize {
        if count == 0 || !origin.is_finite() {
            return 0;
        }
        let ranges = ranges.sanitized();
        let final_factor = self.final_scale_factor;
        let rng = &mut self.rng;

        let spawned: Vec<Particle> = (0..count)
            .map(|_| {
                let velocity = Vec2::new(sample(rng, ranges.vx), sample(rng, ranges.vy));
                let scale = sample(rng, ranges.scale);
                let final_scale = (scale * sample(rng, final_factor)).min(SpawnRanges::MAX_SCALE);
                let lifetime = sample(rng, ranges.lifetime).max(SpawnRanges::MIN_LIFETIME);
                Particle::new(origin, velocity, scale, final_scale, lifetime)
            })
            .collect();
        let n = spawned.len();
        self.store.add(spawned);
        n
    }

    /// Advance the store by `dt` and paint the survivors onto `layer`.
    ///
    /// Returns `(expired, drawn)`.
    pub fn update_and_draw(&mut self, dt: f64, layer: &mut Surface) -> SmokeResult<(usize, usize)> {
        let expired = self.store.update(dt);
        let drawn = self.store.draw(&mut self.raster, &self.look, layer)?;
        Ok((expired, drawn))
    }

    /// One loop iteration: run the spawn policy, then update and draw.
    pub fn tick(&mut self, dt: f64, layer: &mut Surface) -> SmokeResult<TickReport> {
        if !self.running {
            return Ok(TickReport::default());
        }

        let evicted_before = self.store.evicted_total();
        let mut spawned = self.run_policy(dt);
        let (emitted, emitters_expired) = self.run_emitters(dt);
        spawned += emitted;
        let evicted = (self.store.evicted_total() - evicted_before) as usize;
        let (expired, drawn) = self.update_and_draw(dt, layer)?;

        Ok(TickReport {
            ran: true,
            spawned,
            evicted,
            expired,
            drawn,
            live: self.store.count(),
            emitters_expired,
            emitters: self.emitters.len(),
        })
    }

    /// Remove every particle immediately.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    fn run_policy(&mut self, dt: f64) -> usize {
        let ranges = self.ranges;
        match std::mem::take(&mut self.policy) {
            SpawnPolicy::Idle => 0,
            SpawnPolicy::SpawnAtPoint { origin, count } => {
                let spawned = self.add_smoke(origin, count, &ranges);
                self.policy = SpawnPolicy::SpawnAtPoint { origin, count };
                spawned
            }
            SpawnPolicy::ForceClear => {
                self.store.clear();
                self.emitters.clear();
                0
            }
            SpawnPolicy::Custom(mut f) => {
                let mut sink = SpawnSink::default();
                f(dt, &mut sink);
                self.policy = SpawnPolicy::Custom(f);

                if sink.clear {
                    self.store.clear();
                }
                sink.requests
                    .into_iter()
                    .map(|req| {
                        let ranges = req.ranges.unwrap_or(ranges);
                        self.add_smoke(req.origin, req.count, &ranges)
                    })
                    .sum()
            }
        }
    }

    /// Age every emitter by `dt`, drop the expired ones and emit from the rest.
    ///
    /// Returns `(spawned, expired)`.
    fn run_emitters(&mut self, dt: f64) -> (usize, usize) {
        if self.emitters.is_empty() {
            return (0, 0);
        }
        let step = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let mut emitters = std::mem::take(&mut self.emitters);
        for e in &mut emitters {
            e.age += step;
        }
        let before = emitters.len();
        emitters.retain(|e| !e.is_expired());
        let expired = before - emitters.len();
        if expired > 0 {
            tracing::debug!(expired, "emitters expired");
        }

        let spawned: usize = emitters
            .iter()
            .map(|e| {
                let ranges = e.ranges.unwrap_or(self.ranges);
                self.add_smoke(e.origin, e.count, &ranges)
            })
            .sum();
        self.emitters = emitters;
        (spawned, expired)
    }
}

fn sample(rng: &mut StdRng, range: ValueRange) -> f64 {
    let span = range.span();
    if span > 0.0 && span.is_finite() {
        rng.random_range(range.min..=range.max)
    } else {
        range.min
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sim/machine.rs"]
mod tests;
