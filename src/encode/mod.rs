//! Frame sinks for exporting rendered ticks.

pub mod ffmpeg;
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use sink::{FrameSink, InMemorySink, SinkConfig};
