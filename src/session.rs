use std::path::Path;

use crate::config::controls::ConfigSource;
use crate::config::sim::SimulationConfig;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Point, Viewport};
use crate::foundation::error::{SmokeError, SmokeResult};
use crate::interact::{Interaction, InteractionMapper, PointerEvent};
use crate::media::source::{FrameSource, PlaybackState, media_base_name};
use crate::render::composite::composite;
use crate::render::snapshot::{SnapshotImages, SnapshotPaths, write_snapshot};
use crate::render::surface::{Surface, Surfaces};
use crate::sim::machine::{SmokeMachine, SpawnPolicy, TickReport};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionOpts {
    pub viewport: Viewport,
    /// Premultiplied color the composite is cleared to before the frame is drawn.
    pub background: [u8; 4],
    /// Emit from the bottom centre of the viewport until the pointer takes over.
    pub emit_from_bottom_center: bool,
}

impl SessionOpts {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            background: [0, 0, 0, 255],
            emit_from_bottom_center: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The source is paused or has ended; nothing was simulated or drawn.
    Halted(PlaybackState),
    Rendered(TickReport),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames: u64,
    /// Set when the source stopped playing before the requested range was done.
    pub halted_early: bool,
}

/// Result of [`Session::augment`]: the composited frame and the smoke drawn over black.
#[derive(Clone, Debug)]
pub struct Augmented {
    pub image: image::RgbaImage,
    pub mask: image::RgbaImage,
}

/// Drives one media source, one smoke machine and the three drawing surfaces.
pub struct Session<C: ConfigSource> {
    controls: C,
    source: Box<dyn FrameSource>,
    machine: SmokeMachine,
    surfaces: Surfaces,
    opts: SessionOpts,
    config: SimulationConfig,
    generation: u64,
    default_emitter: bool,
    frame_time: f64,
    ticks: u64,
}

impl<C: ConfigSource> Session<C> {
    pub fn new(controls: C, source: Box<dyn FrameSource>, opts: SessionOpts) -> Self {
        let config = controls.snapshot();
        let generation = controls.generation();
        let mut session = Self {
            machine: SmokeMachine::new(&config),
            surfaces: Surfaces::new(opts.viewport),
            frame_time: source.timestamp_sec(),
            controls,
            source,
            opts,
            config,
            generation,
            default_emitter: false,
            ticks: 0,
        };
        session.machine.start();
        if opts.emit_from_bottom_center {
            session.install_default_emitter();
        }
        session
    }

    pub fn controls(&self) -> &C {
        &self.controls
    }

    /// Mutable access to the configuration owner. Changes take effect on the next tick.
    pub fn controls_mut(&mut self) -> &mut C {
        &mut self.controls
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn machine(&self) -> &SmokeMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut SmokeMachine {
        &mut self.machine
    }

    pub fn source(&self) -> &dyn FrameSource {
        self.source.as_ref()
    }

    pub fn source_mut(&mut self) -> &mut dyn FrameSource {
        self.source.as_mut()
    }

    /// Swap the media source. Particles and policy are kept.
    pub fn replace_source(&mut self, source: Box<dyn FrameSource>) -> Box<dyn FrameSource> {
        self.frame_time = source.timestamp_sec();
        std::mem::replace(&mut self.source, source)
    }

    pub fn surfaces(&self) -> &Surfaces {
        &self.surfaces
    }

    pub fn viewport(&self) -> Viewport {
        self.opts.viewport
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Media time of the most recently drawn frame.
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    /// Change the logical size. Surfaces are resized at the start of the next tick.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.opts.viewport = viewport;
        if self.default_emitter {
            self.install_default_emitter();
        }
    }

    /// One frame: refresh config, resize-and-clear, draw the media frame, step the smoke, and
    /// composite. Does nothing while the source is paused or ended.
    #[tracing::instrument(level = "debug", skip(self), fields(tick = self.ticks))]
    pub fn tick(&mut self, dt: f64) -> SmokeResult<TickOutcome> {
        let state = self.source.state();
        if state != PlaybackState::Playing {
            return Ok(TickOutcome::Halted(state));
        }

        self.config = self.controls.snapshot();
        let generation = self.controls.generation();
        if generation != self.generation {
            self.rebuild_machine();
            self.generation = generation;
        }

        let viewport = self.opts.viewport;
        self.surfaces.prepare(viewport);

        let frame = self.source.current_frame()?;
        self.frame_time = self.source.timestamp_sec();
        self.surfaces.raw_frame.load_image(&frame)?;

        let report = self.machine.tick(dt, &mut self.surfaces.effect)?;

        self.surfaces.composite.fill(self.opts.background);
        composite(
            &self.surfaces.raw_frame,
            &self.surfaces.effect,
            &mut self.surfaces.composite,
            self.config.blend_opacity,
        )?;

        self.source.advance(dt);
        self.ticks += 1;
        tracing::trace!(?report, "tick rendered");
        Ok(TickOutcome::Rendered(report))
    }

    /// Apply a pointer event and return how it was interpreted.
    ///
    /// Spawn counts come from the current controls, not the last tick's snapshot.
    pub fn handle_pointer(
        &mut self,
        mapper: &InteractionMapper,
        event: PointerEvent,
    ) -> Interaction {
        let action = mapper.interpret(event);
        match action {
            Interaction::None => {}
            Interaction::Hover(p) => {
                let cfg = self.controls.snapshot();
                self.machine.add_smoke(p, cfg.particles_per_tick, &cfg.spawn);
            }
            Interaction::InstallSpawn(p) => {
                self.default_emitter = false;
                let count = self.controls.snapshot().particles_per_tick;
                self.machine.set_spawn_policy(SpawnPolicy::SpawnAtPoint { origin: p, count });
            }
            Interaction::Clear => {
                self.default_emitter = false;
                self.machine.set_spawn_policy(SpawnPolicy::ForceClear);
            }
        }
        action
    }

    /// Copies of the effect layer, composite and raw frame from the last tick.
    pub fn snapshot_images(&self) -> SmokeResult<SnapshotImages> {
        SnapshotImages::capture(
            &self.surfaces.effect,
            &self.surfaces.composite,
            &self.surfaces.raw_frame,
        )
    }

    /// Write the three snapshot PNGs named after the media and the last frame's time.
    pub fn write_snapshot(&self, out_dir: &Path) -> SmokeResult<SnapshotPaths> {
        let images = self.snapshot_images()?;
        let base = media_base_name(self.source.name());
        write_snapshot(&images, out_dir, &base, self.frame_time)
    }

    /// Render `ticks` frames of `1 / fps` seconds into `sink`, and the effect layer into
    /// `mask_sink` when given. Stops early if the source stops playing.
    #[tracing::instrument(skip(self, sink, mask_sink))]
    pub fn render_range(
        &mut self,
        ticks: u64,
        fps: u32,
        sink: &mut dyn FrameSink,
        mut mask_sink: Option<&mut dyn FrameSink>,
    ) -> SmokeResult<RenderStats> {
        if fps == 0 {
            return Err(SmokeError::validation("render fps must be non-zero"));
        }
        let vp = self.opts.viewport;
        let cfg = SinkConfig {
            width: vp.width,
            height: vp.height,
            fps,
        };
        let dt = 1.0 / f64::from(fps);

        sink.begin(cfg)?;
        if let Some(mask) = mask_sink.as_deref_mut() {
            mask.begin(cfg)?;
        }

        let mut stats = RenderStats::default();
        for idx in 0..ticks {
            match self.tick(dt)? {
                TickOutcome::Halted(state) => {
                    tracing::info!(?state, frames = stats.frames, "source stopped; ending render");
                    stats.halted_early = true;
                    break;
                }
                TickOutcome::Rendered(_) => {
                    sink.push_frame(idx, &self.surfaces.composite)?;
                    if let Some(mask) = mask_sink.as_deref_mut() {
                        mask.push_frame(idx, &self.surfaces.effect)?;
                    }
                    stats.frames += 1;
                }
            }
        }

        sink.end()?;
        if let Some(mask) = mask_sink.as_deref_mut() {
            mask.end()?;
        }
        Ok(stats)
    }

    /// Run `steps` ticks of `dt` seconds and return the final composite and smoke mask.
    pub fn augment(&mut self, steps: u32, dt: f64) -> SmokeResult<Augmented> {
        if steps == 0 {
            return Err(SmokeError::validation("augment needs at least one step"));
        }
        for _ in 0..steps {
            if let TickOutcome::Halted(state) = self.tick(dt)? {
                return Err(SmokeError::media(format!(
                    "source is {state:?}; cannot augment"
                )));
            }
        }

        let mut mask = Surface::new(self.surfaces.effect.viewport());
        mask.fill([0, 0, 0, 255]);
        mask.draw_image(&self.surfaces.effect)?;

        Ok(Augmented {
            image: self.surfaces.composite.to_rgba_image()?,
            mask: mask.to_rgba_image()?,
        })
    }

    fn rebuild_machine(&mut self) {
        tracing::debug!(
            generation = self.controls.generation(),
            "configuration changed; resetting particles"
        );
        let mut previous = std::mem::replace(&mut self.machine, SmokeMachine::new(&self.config));
        self.machine.start();
        if self.opts.emit_from_bottom_center {
            self.install_default_emitter();
        } else {
            let policy = previous.set_spawn_policy(SpawnPolicy::Idle);
            self.machine.set_spawn_policy(policy);
        }
    }

    fn install_default_emitter(&mut self) {
        let vp = self.opts.viewport;
        self.default_emitter = true;
        self.machine.set_spawn_policy(SpawnPolicy::SpawnAtPoint {
            origin: Point::new(f64::from(vp.width) / 2.0, f64::from(vp.height)),
            count: self.config.particles_per_tick,
        });
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
