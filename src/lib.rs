#![forbid(unsafe_code)]
//! Particle smoke simulation composited over video frames.
//!
//! A [`Session`] owns a [`FrameSource`], a [`SmokeMachine`] and three drawing surfaces. Each
//! [`Session::tick`] draws the current media frame, steps the particles, and blends the smoke
//! layer over the frame at the configured opacity.

pub mod config;
pub mod encode;
pub mod foundation;
pub mod interact;
pub mod media;
pub mod render;
pub mod session;
pub mod sim;

pub use config::controls::{ConfigSource, Control, Controls};
pub use config::sim::{CloudParams, EmitterConfig, SimulationConfig, SpawnRanges, SpriteShape};
pub use encode::{FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{Point, Rect, Rgb8, ValueRange, Vec2, Viewport};
pub use foundation::error::{SmokeError, SmokeResult};
pub use interact::{Interaction, InteractionMapper, PointerEvent, PointerMapper};
pub use media::{FrameSource, PlaybackState, media_base_name, open_source};
pub use render::composite::composite;
pub use render::noise::cloud_mask;
pub use render::snapshot::{SnapshotNames, SnapshotPaths, snapshot_names};
pub use render::surface::{Surface, Surfaces};
pub use session::{Augmented, RenderStats, Session, SessionOpts, TickOutcome};
pub use sim::machine::{
    Emitter, EmitterId, SmokeMachine, SpawnPolicy, SpawnRequest, SpawnSink, TickReport,
};
pub use sim::particle::Particle;
pub use sim::store::ParticleStore;
