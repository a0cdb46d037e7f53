use std::ops::{Deref, DerefMut};
use std::path::Path;

use crate::foundation::core::Viewport;
use crate::foundation::error::{SmokeError, SmokeResult};
use crate::render::composite::over_in_place;

/// A 2D drawing destination holding **premultiplied** RGBA8 pixels.
///
/// Like a canvas context, a surface carries a mutable global alpha applied to every
/// [`Surface::draw_image`] call. Prefer [`Surface::with_global_alpha`], which restores the
/// previous value when the guard drops.
#[derive(Clone, Debug)]
pub struct Surface {
    viewport: Viewport,
    data: Vec<u8>,
    global_alpha: f32,
}

impl Surface {
    /// Create a transparent surface.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            data: vec![0u8; viewport.byte_len()],
            global_alpha: 1.0,
        }
    }

    /// Create a surface from straight-alpha RGBA8 pixels.
    pub fn from_rgba_image(img: &image::RgbaImage) -> SmokeResult<Self> {
        let (w, h) = img.dimensions();
        let viewport = Viewport::new(w, h)?;
        let mut data = img.as_raw().clone();
        premultiply_rgba8_in_place(&mut data);
        Ok(Self {
            viewport,
            data,
            global_alpha: 1.0,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn width(&self) -> u32 {
        self.viewport.width
    }

    pub fn height(&self) -> u32 {
        self.viewport.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let idx = ((y as usize) * (self.width() as usize) + (x as usize)) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Resize to `viewport`. Resizing always clears the contents, even when the size is unchanged.
    pub fn resize(&mut self, viewport: Viewport) {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.data = vec![0u8; viewport.byte_len()];
        } else {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn fill(&mut self, premul: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
    }

    pub fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    /// Set global alpha for the lifetime of the returned guard.
    pub fn with_global_alpha(&mut self, alpha: f32) -> AlphaGuard<'_> {
        let restore = self.global_alpha;
        self.set_global_alpha(alpha);
        AlphaGuard {
            surface: self,
            restore,
        }
    }

    /// Draw `src` over this surface at the current global alpha, stretching it to fill this
    /// surface when sizes differ.
    pub fn draw_image(&mut self, src: &Surface) -> SmokeResult<()> {
        let alpha = self.global_alpha;
        if src.viewport == self.viewport {
            return over_in_place(&mut self.data, &src.data, alpha);
        }
        let scaled = src.scaled_to(self.viewport)?;
        over_in_place(&mut self.data, &scaled.data, alpha)
    }

    /// Replace the contents with a straight-alpha image stretched to this surface's size.
    pub fn load_image(&mut self, img: &image::RgbaImage) -> SmokeResult<()> {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(SmokeError::media("cannot load an empty frame"));
        }
        let mut data = if (w, h) == (self.width(), self.height()) {
            img.as_raw().clone()
        } else {
            image::imageops::resize(
                img,
                self.width(),
                self.height(),
                image::imageops::FilterType::Triangle,
            )
            .into_raw()
        };
        premultiply_rgba8_in_place(&mut data);
        self.data = data;
        Ok(())
    }

    /// Return a copy resampled to `viewport`.
    pub fn scaled_to(&self, viewport: Viewport) -> SmokeResult<Surface> {
        if viewport == self.viewport {
            return Ok(self.clone());
        }
        // Premultiplied data resamples without color fringes.
        let buf = image::RgbaImage::from_raw(self.width(), self.height(), self.data.clone())
            .ok_or_else(|| SmokeError::render("surface buffer does not match its size"))?;
        let resized = image::imageops::resize(
            &buf,
            viewport.width,
            viewport.height,
            image::imageops::FilterType::Triangle,
        );
        Ok(Surface {
            viewport,
            data: resized.into_raw(),
            global_alpha: 1.0,
        })
    }

    /// Convert to a straight-alpha image for export.
    pub fn to_rgba_image(&self) -> SmokeResult<image::RgbaImage> {
        let mut data = self.data.clone();
        unpremultiply_rgba8_in_place(&mut data);
        image::RgbaImage::from_raw(self.width(), self.height(), data)
            .ok_or_else(|| SmokeError::render("surface buffer does not match its size"))
    }

    pub fn save_png(&self, path: &Path) -> SmokeResult<()> {
        use anyhow::Context as _;
        self.to_rgba_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Restores a surface's global alpha on drop, including on early `?` returns.
pub struct AlphaGuard<'a> {
    surface: &'a mut Surface,
    restore: f32,
}

impl Deref for AlphaGuard<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        &*self.surface
    }
}

impl DerefMut for AlphaGuard<'_> {
    fn deref_mut(&mut self) -> &mut Surface {
        &mut *self.surface
    }
}

impl Drop for AlphaGuard<'_> {
    fn drop(&mut self) {
        self.surface.global_alpha = self.restore;
    }
}

/// The three per-tick drawing destinations.
#[derive(Clone, Debug)]
pub struct Surfaces {
    /// Current media frame, stretched to the viewport.
    pub raw_frame: Surface,
    /// Particles only.
    pub effect: Surface,
    /// Media frame with the effect layer blended over it.
    pub composite: Surface,
}

impl Surfaces {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            raw_frame: Surface::new(viewport),
            effect: Surface::new(viewport),
            composite: Surface::new(viewport),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.composite.viewport()
    }

    /// Resize-then-clear every surface to `viewport`.
    ///
    /// Must run once per tick before anything is drawn: resizing after drawing would erase the
    /// frame.
    pub fn prepare(&mut self, viewport: Viewport) {
        self.raw_frame.resize(viewport);
        self.effect.resize(viewport);
        self.composite.resize(viewport);
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
