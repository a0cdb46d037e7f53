use crate::foundation::error::{SmokeError, SmokeResult};
use crate::foundation::math::{mul_div255_u8, opacity_to_u8};
use crate::render::surface::Surface;

pub type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = opacity_to_u8(opacity);
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> SmokeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SmokeError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    if opacity <= 0.0 {
        return Ok(());
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Draw `video_frame` into `destination` at full opacity, then `effect_layer` at
/// `blend_opacity`.
///
/// The destination's global alpha is 1.0 when this returns, on success and on error.
pub fn composite(
    video_frame: &Surface,
    effect_layer: &Surface,
    destination: &mut Surface,
    blend_opacity: f32,
) -> SmokeResult<()> {
    destination.set_global_alpha(1.0);
    destination.draw_image(video_frame)?;

    let mut dst = destination.with_global_alpha(blend_opacity);
    dst.draw_image(effect_layer)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
