//! Frame sources the effect is composited over.

pub mod source;
pub mod video;

pub use source::{
    FrameSource, ImageSource, Playback, PlaybackState, SolidSource, media_base_name, open_source,
};
pub use video::{VideoSource, VideoSourceInfo, probe_video};
