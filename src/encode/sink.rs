use crate::foundation::error::{SmokeError, SmokeResult};
use crate::render::surface::Surface;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl SinkConfig {
    pub fn validate(&self) -> SmokeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SmokeError::validation("sink width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(SmokeError::validation("sink fps must be non-zero"));
        }
        Ok(())
    }
}

/// Sink contract for consuming rendered ticks.
///
/// `push_frame` is called with strictly increasing indices between `begin` and `end`. Frames are
/// premultiplied RGBA8 surfaces of the configured size.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> SmokeResult<()>;
    fn push_frame(&mut self, idx: u64, frame: &Surface) -> SmokeResult<()>;
    fn end(&mut self) -> SmokeResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    ended: bool,
    /// Frames in push order.
    pub frames: Vec<(u64, Surface)>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> SmokeResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.ended = false;
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &Surface) -> SmokeResult<()> {
        if self.cfg.is_none() {
            return Err(SmokeError::encode("in-memory sink not started"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> SmokeResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
