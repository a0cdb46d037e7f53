use std::path::{Path, PathBuf};

use crate::foundation::error::{SmokeError, SmokeResult};
use crate::render::surface::Surface;

/// File names for one snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotNames {
    /// Effect layer only: `smoke_<base>_ts_<t>.png`.
    pub effect: String,
    /// Composite: `blended_<base>_ts_<t>.png`.
    pub blended: String,
    /// Media frame: `<base>_ts_<t>.png`.
    pub frame: String,
}

/// Build deterministic names from the media base name and the media time in seconds.
///
/// The timestamp uses the shortest round-tripping form, so `0.0` prints as `0`.
pub fn snapshot_names(base: &str, timestamp_sec: f64) -> SnapshotNames {
    let stem = format!("{base}_ts_{timestamp_sec}");
    SnapshotNames {
        effect: format!("smoke_{stem}.png"),
        blended: format!("blended_{stem}.png"),
        frame: format!("{stem}.png"),
    }
}

/// Independent copies of the three surfaces at the moment of capture.
#[derive(Clone, Debug)]
pub struct SnapshotImages {
    pub effect: image::RgbaImage,
    pub blended: image::RgbaImage,
    pub frame: image::RgbaImage,
}

impl SnapshotImages {
    pub fn capture(effect: &Surface, blended: &Surface, frame: &Surface) -> SmokeResult<Self> {
        Ok(Self {
            effect: effect.to_rgba_image()?,
            blended: blended.to_rgba_image()?,
            frame: frame.to_rgba_image()?,
        })
    }
}

/// Paths written by [`write_snapshot`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub effect: PathBuf,
    pub blended: PathBuf,
    pub frame: PathBuf,
}

#[tracing::instrument(skip(images))]
pub fn write_snapshot(
    images: &SnapshotImages,
    out_dir: &Path,
    base: &str,
    timestamp_sec: f64,
) -> SmokeResult<SnapshotPaths> {
    use anyhow::Context as _;

    if base.is_empty() {
        return Err(SmokeError::validation("snapshot base name is empty"));
    }
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create snapshot dir '{}'", out_dir.display()))?;

    let names = snapshot_names(base, timestamp_sec);
    let paths = SnapshotPaths {
        effect: out_dir.join(&names.effect),
        blended: out_dir.join(&names.blended),
        frame: out_dir.join(&names.frame),
    };

    for (img, path) in [
        (&images.effect, &paths.effect),
        (&images.blended, &paths.blended),
        (&images.frame, &paths.frame),
    ] {
        img.save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write snapshot '{}'", path.display()))?;
    }
    tracing::info!(dir = %out_dir.display(), "snapshot written");
    Ok(paths)
}

#[cfg(test)]
#[path = "../../tests/unit/render/snapshot.rs"]
mod tests;
