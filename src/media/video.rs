use std::path::{Path, PathBuf};

use crate::foundation::error::{SmokeError, SmokeResult};
use crate::media::source::{FrameSource, Playback};

#[derive(Clone, Debug, PartialEq)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
}

impl VideoSourceInfo {
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }

    /// Snap `time_sec` onto the start of the source frame that contains it.
    pub fn frame_time(&self, time_sec: f64) -> f64 {
        let fps = self.source_fps();
        if fps <= 0.0 || !time_sec.is_finite() {
            return time_sec.max(0.0);
        }
        ((time_sec.max(0.0) * fps).floor()) / fps
    }
}

/// A video file decoded one frame at a time through the system `ffmpeg`.
#[derive(Debug)]
pub struct VideoSource {
    name: String,
    info: VideoSourceInfo,
    playback: Playback,
    cached: Option<(f64, image::RgbaImage)>,
}

impl VideoSource {
    pub fn open(path: &Path, looping: bool) -> SmokeResult<Self> {
        let info = probe_video(path)?;
        let duration = (info.duration_sec > 0.0).then_some(info.duration_sec);
        tracing::debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.source_fps(),
            "opened video source"
        );
        Ok(Self {
            name: path.to_string_lossy().into_owned(),
            info,
            playback: Playback::new(duration, looping),
            cached: None,
        })
    }

    pub fn info(&self) -> &VideoSourceInfo {
        &self.info
    }
}

impl FrameSource for VideoSource {
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
        let t = self.info.frame_time(self.playback.time());
        if let Some((cached_t, frame)) = &self.cached
            && *cached_t == t
        {
            return Ok(frame.clone());
        }

        let rgba = decode_video_frame_rgba8(&self.info, t)?;
        let frame = image::RgbaImage::from_raw(self.info.width, self.info.height, rgba)
            .ok_or_else(|| SmokeError::media("decoded video frame has the wrong size"))?;
        self.cached = Some((t, frame.clone()));
        Ok(frame)
    }
}

#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> SmokeResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| SmokeError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SmokeError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| SmokeError::media(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| SmokeError::media("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| SmokeError::media("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| SmokeError::media("missing video height from ffprobe"))?;

    let (fps_num, fps_den) =
        parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
            .ok_or_else(|| SmokeError::media("invalid video r_frame_rate"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path) -> SmokeResult<VideoSourceInfo> {
    Err(SmokeError::media(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn decode_video_frame_rgba8(source: &VideoSourceInfo, time_sec: f64) -> SmokeResult<Vec<u8>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{time_sec:.9}")])
        .arg("-i")
        .arg(&source.source_path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| SmokeError::media(format!("failed to run ffmpeg for video decode: {e}")))?;

    if !out.status.success() {
        return Err(SmokeError::media(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = source.width as usize * source.height as usize * 4;
    if expected_len == 0 {
        return Err(SmokeError::media(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if out.stdout.len() < expected_len {
        return Err(SmokeError::media(format!(
            "ffmpeg returned no video frame for '{}' at {time_sec}s",
            source.source_path.display()
        )));
    }
    let mut frame = out.stdout;
    frame.truncate(expected_len);
    Ok(frame)
}

#[cfg(not(feature = "media-ffmpeg"))]
fn decode_video_frame_rgba8(_source: &VideoSourceInfo, _time_sec: f64) -> SmokeResult<Vec<u8>> {
    Err(SmokeError::media(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

#[cfg(any(feature = "media-ffmpeg", test))]
fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/media/video.rs"]
mod tests;
