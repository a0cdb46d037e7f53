use std::sync::Arc;

use crate::config::sim::{CloudParams, SimulationConfig, SpawnRanges, SpriteShape};
use crate::foundation::core::Rgb8;
use crate::foundation::error::{SmokeError, SmokeResult};
use crate::render::composite::over_in_place;
use crate::render::noise::{cloud_mask, cloud_sprite_premul};
use crate::render::surface::Surface;
use crate::sim::particle::Particle;

/// Everything about a particle's appearance that comes from configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleLook {
    pub color: Rgb8,
    /// Multiplier applied on top of each particle's own opacity.
    pub alpha: f32,
    pub shape: SpriteShape,
    pub sprite_size: u32,
    pub seed: u64,
}

impl ParticleLook {
    pub fn from_config(cfg: &SimulationConfig) -> Self {
        Self {
            color: cfg.color,
            alpha: cfg.particle_alpha,
            shape: cfg.sprite,
            sprite_size: cfg.sprite_size.max(1),
            seed: cfg.seed,
        }
    }
}

impl Default for ParticleLook {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SpriteKey {
    color: Rgb8,
    size: u32,
    params: CloudParams,
    seed: u64,
}

/// CPU rasterizer for particle sprites.
///
/// Holds a scratch pixmap and the tinted cloud sprite between frames; both are rebuilt only when
/// the layer size or the look changes.
#[derive(Default)]
pub struct ParticleRaster {
    pixmap: Option<vello_cpu::Pixmap>,
    sprite: Option<(SpriteKey, vello_cpu::Image)>,
}

impl std::fmt::Debug for ParticleRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleRaster")
            .field("has_pixmap", &self.pixmap.is_some())
            .field("sprite", &self.sprite.as_ref().map(|(k, _)| *k))
            .finish()
    }
}

impl ParticleRaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `particles` over `layer` and return how many were painted.
    ///
    /// Each particle is centred on its position with diameter `scale`, at opacity
    /// `particle.opacity() * look.alpha`.
    pub fn draw(
        &mut self,
        particles: &[Particle],
        look: &ParticleLook,
        layer: &mut Surface,
    ) -> SmokeResult<usize> {
        if particles.is_empty() {
            return Ok(0);
        }

        let width: u16 = layer
            .width()
            .try_into()
            .map_err(|_| SmokeError::render("layer width exceeds u16"))?;
        let height: u16 = layer
            .height()
            .try_into()
            .map_err(|_| SmokeError::render("layer height exceeds u16"))?;

        let sprite = match look.shape {
            SpriteShape::Disc => None,
            SpriteShape::Cloud(params) => Some(self.sprite_for(look, params)?),
        };

        let mut pixmap = match self.pixmap.take() {
            Some(p) if p.width() == width && p.height() == height => p,
            _ => vello_cpu::Pixmap::new(width, height),
        };
        pixmap.data_as_u8_slice_mut().fill(0);

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let mut drawn = 0usize;
        for p in particles {
            let opacity = (p.opacity() * look.alpha).clamp(0.0, 1.0);
            if opacity <= 0.0 || !(p.scale > 0.0) || !p.position.is_finite() {
                continue;
            }
            let radius = p.scale.min(SpawnRanges::MAX_SCALE) / 2.0;
            let (x, y) = (p.position.x, p.position.y);
            if x + radius < 0.0
                || y + radius < 0.0
                || x - radius > f64::from(width)
                || y - radius > f64::from(height)
            {
                continue;
            }

            match &sprite {
                None => {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        look.color.r,
                        look.color.g,
                        look.color.b,
                        (opacity * 255.0).round() as u8,
                    ));
                    let circle = vello_cpu::kurbo::Circle::new(
                        vello_cpu::kurbo::Point::new(p.position.x, p.position.y),
                        radius,
                    );
                    ctx.fill_path(&vello_cpu::kurbo::Shape::to_path(&circle, 0.1));
                }
                Some(image) => {
                    let size = f64::from(look.sprite_size);
                    let transform = vello_cpu::kurbo::Affine::translate((
                        p.position.x - radius,
                        p.position.y - radius,
                    )) * vello_cpu::kurbo::Affine::scale(2.0 * radius / size);
                    ctx.set_transform(transform);
                    ctx.set_paint(image.clone());
                    ctx.push_opacity_layer(opacity);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, size, size));
                    ctx.pop_layer();
                }
            }
            drawn += 1;
        }

        if drawn > 0 {
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            over_in_place(layer.data_mut(), pixmap.data_as_u8_slice(), 1.0)?;
        }
        self.pixmap = Some(pixmap);
        Ok(drawn)
    }

    fn sprite_for(
        &mut self,
        look: &ParticleLook,
        params: CloudParams,
    ) -> SmokeResult<vello_cpu::Image> {
        let key = SpriteKey {
            color: look.color,
            size: look.sprite_size,
            params,
            seed: look.seed,
        };
        if let Some((k, image)) = &self.sprite
            && *k == key
        {
            return Ok(image.clone());
        }

        let mask = cloud_mask(key.size, key.size, &params, key.seed);
        let premul = cloud_sprite_premul(&mask, key.color);
        let pixmap = premul_bytes_to_pixmap(&premul, key.size, key.size)?;
        let image = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        tracing::debug!(size = key.size, seed = key.seed, "built cloud sprite");
        self.sprite = Some((key, image.clone()));
        Ok(image)
    }
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> SmokeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SmokeError::render("sprite width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SmokeError::render("sprite height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(SmokeError::render("sprite byte length mismatch"));
    }

    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
