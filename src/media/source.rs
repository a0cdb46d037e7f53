use std::path::{Path, PathBuf};

use crate::foundation::core::Rgb8;
use crate::foundation::error::{SmokeError, SmokeResult};
use crate::media::video::VideoSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Ended,
}

/// Media clock shared by every [`FrameSource`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playback {
    time: f64,
    /// `None` for sources without a natural end (stills, solid colors).
    duration: Option<f64>,
    looping: bool,
    paused: bool,
    ended: bool,
}

impl Playback {
    pub fn new(duration: Option<f64>, looping: bool) -> Self {
        Self {
            time: 0.0,
            duration: duration.filter(|d| d.is_finite() && *d > 0.0),
            looping,
            paused: false,
            ended: false,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn state(&self) -> PlaybackState {
        if self.ended {
            PlaybackState::Ended
        } else if self.paused {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Jump to `time`, clearing the ended flag.
    pub fn seek(&mut self, time: f64) {
        let t = if time.is_finite() { time.max(0.0) } else { 0.0 };
        self.time = match self.duration {
            Some(d) => t.min(d),
            None => t,
        };
        self.ended = false;
    }

    /// Move the clock forward while playing. Looping sources wrap; others stop at the end.
    pub fn advance(&mut self, dt: f64) {
        if self.state() != PlaybackState::Playing || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.time += dt;
        if let Some(d) = self.duration
            && self.time >= d
        {
            if self.looping {
                self.time = self.time.rem_euclid(d);
            } else {
                self.time = d;
                self.ended = true;
            }
        }
    }
}

/// Something that yields a frame for the current media time.
pub trait FrameSource {
    /// Identifier used to derive snapshot names (a path or URL).
    fn name(&self) -> &str;

    fn playback(&self) -> &Playback;

    fn playback_mut(&mut self) -> &mut Playback;

    /// Straight-alpha RGBA8 frame at the current media time.
    fn current_frame(&mut self) -> SmokeResult<image::RgbaImage>;

    fn state(&self) -> PlaybackState {
        self.playback().state()
    }

    fn timestamp_sec(&self) -> f64 {
        self.playback().time()
    }

    fn advance(&mut self, dt: f64) {
        self.playback_mut().advance(dt);
    }

    fn set_paused(&mut self, paused: bool) {
        self.playback_mut().set_paused(paused);
    }
}

impl std::fmt::Debug for dyn FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("name", &self.name())
            .field("playback", self.playback())
            .finish()
    }
}

/// A constant-color frame.
#[derive(Clone, Debug)]
pub struct SolidSource {
    name: String,
    color: Rgb8,
    width: u32,
    height: u32,
    playback: Playback,
}

impl SolidSource {
    pub fn new(color: Rgb8, width: u32, height: u32) -> SmokeResult<Self> {
        if width == 0 || height == 0 {
            return Err(SmokeError::validation("solid source size must be > 0"));
        }
        Ok(Self {
            name: format!("solid_{}", color.to_hex().trim_start_matches('#')),
            color,
            width,
            height,
            playback: Playback::new(None, true),
        })
    }
}

impl FrameSource for SolidSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn playback(&self) -> &Playback {
        &self.playback
    }

    fn playback_mut(&mut self) -> &mut Playback {
        &mut self.playback
    }

    fn current_frame(&mut self) -> SmokeResult<image::RgbaImage> {
        let Rgb8 { r, g, b } = self.color;
        Ok(image::RgbaImage::from_pixel(
            self.width,
            self.height,
            image::Rgba([r, g, b, 255]),
        ))
    }
}

/// A still image shown for every tick.
#[derive(Clone, Debug)]
pub struct ImageSource {
    name: String,
    frame: image::RgbaImage,
    playback: Playback,
}

impl ImageSource {
    pub fn open(path: &Path) -> SmokeResult<Self> {
        let img = image::open(path).map_err(|e| {
            SmokeError::media(format!("failed to open image '{}': {e}", path.display()))
        })?;
        Ok(Self::from_image(path.to_string_lossy().into_owned(), img.to_rgba8()))
    }

    pub fn from_image(name: impl Into<String>, frame: image::RgbaImage) -> Self {
        Self {
            name: name.into(),
            frame,
            playback: Playback::new(None, true),
        }
    }
}

impl FrameSource for ImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn playback(&self) -> &Playback {
        &self.playback
    }

    fn playback_mut(&mut self) -> &mut Playback {
        &mut self.playback
    }

    fn current_frame(&mut self) -> SmokeResult<image::RgbaImage> {
        Ok(self.frame.clone())
    }
}

/// Last path segment of `path_or_url`, cut at its first `.`.
///
/// `https://host/media/clip.final.mp4?x=1` gives `clip`.
pub fn media_base_name(path_or_url: &str) -> String {
    let no_query = path_or_url
        .split(['?', '#'])
        .next()
        .unwrap_or(path_or_url);
    let segment = no_query
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(no_query);
    segment.split('.').next().unwrap_or(segment).to_string()
}

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "gif", "webp", "tiff"];

/// Open a frame source from a CLI-style locator.
///
/// `solid:#RRGGBB[@WxH]` builds a [`SolidSource`] (default 640x360), known image extensions open
/// an [`ImageSource`], and anything else is treated as a video file.
pub fn open_source(locator: &str, looping: bool) -> SmokeResult<Box<dyn FrameSource>> {
    if let Some(rest) = locator.strip_prefix("solid:") {
        let (hex, size) = match rest.split_once('@') {
            Some((hex, size)) => (hex, Some(size)),
            None => (rest, None),
        };
        let color = Rgb8::from_hex(hex).map_err(SmokeError::validation)?;
        let (w, h) = match size {
            Some(s) => {
                let vp: crate::foundation::core::Viewport = s.parse()?;
                (vp.width, vp.height)
            }
            None => (640, 360),
        };
        return Ok(Box::new(SolidSource::new(color, w, h)?));
    }

    let path = PathBuf::from(locator);
    if !path.exists() {
        return Err(SmokeError::media(format!(
            "media source '{}' does not exist",
            path.display()
        )));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(Box::new(ImageSource::open(&path)?));
    }
    Ok(Box::new(VideoSource::open(&path, looping)?))
}

#[cfg(test)]
#[path = "../../tests/unit/media/source.rs"]
mod tests;
