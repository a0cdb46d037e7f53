use crate::config::sim::CloudParams;
use crate::foundation::core::Rgb8;
use crate::foundation::math::{hash_lattice, mul_div255_u8};

/// Lift applied inside the falloff disc so thin noise never vanishes entirely.
const MASK_FLOOR: f64 = 5.0;

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Unit gradient for a lattice corner, derived from the hash so no permutation table is stored.
fn gradient(seed: u64, ix: i64, iy: i64) -> (f64, f64) {
    let h = hash_lattice(seed, ix, iy);
    let angle = (f64::from(h) / f64::from(u32::MAX)) * std::f64::consts::TAU;
    (angle.cos(), angle.sin())
}

fn dot_grid_gradient(seed: u64, ix: i64, iy: i64, x: f64, y: f64) -> f64 {
    let (gx, gy) = gradient(seed, ix, iy);
    gx * (x - ix as f64) + gy * (y - iy as f64)
}

/// Classic 2D gradient noise, roughly in [-1, 1].
pub fn perlin2(seed: u64, x: f64, y: f64) -> f64 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let (x1, y1) = (x0 + 1, y0 + 1);

    let sx = fade(x - x0 as f64);
    let sy = fade(y - y0 as f64);

    let ix0 = lerp(
        dot_grid_gradient(seed, x0, y0, x, y),
        dot_grid_gradient(seed, x1, y0, x, y),
        sx,
    );
    let ix1 = lerp(
        dot_grid_gradient(seed, x0, y1, x, y),
        dot_grid_gradient(seed, x1, y1, x, y),
        sx,
    );
    lerp(ix0, ix1, sy)
}

/// Sum of `octaves` noise layers, normalized by the total amplitude.
pub fn fractal_noise(seed: u64, x: f64, y: f64, params: &CloudParams) -> f64 {
    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    let mut max_value = 0.0;

    for _ in 0..params.octaves.max(1) {
        total += perlin2(seed, x * frequency, y * frequency) * amplitude;
        max_value += amplitude;
        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }

    if max_value > 0.0 {
        total / max_value
    } else {
        0.0
    }
}

/// Grayscale cloud mask of `width * height` bytes, row-major.
///
/// Noise is mapped to [0, 255] and then attenuated by a radial falloff centred on the image, so
/// the corners are fully transparent and the centre is the densest region.
pub fn cloud_mask(width: u32, height: u32, params: &CloudParams, seed: u64) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    let mut out = vec![0u8; w * h];
    if w == 0 || h == 0 {
        return out;
    }

    let scale = params.noise_scale;
    let cx = f64::from(width / 2);
    let cy = f64::from(height / 2);
    let max_distance = (cx * cx + cy * cy).sqrt();

    for y in 0..h {
        for x in 0..w {
            let n = fractal_noise(seed, x as f64 / scale, y as f64 / scale, params);
            let v = ((n + 1.0) / 2.0).clamp(0.0, 1.0) * 255.0;

            let d = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
            let edge = if max_distance > 0.0 {
                ((max_distance - d) / max_distance).max(0.0)
            } else {
                1.0
            };
            let factor = edge.powf(params.falloff);
            let masked = if factor > 0.0 {
                v.floor() * factor + MASK_FLOOR
            } else {
                0.0
            };
            out[y * w + x] = masked.clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Tint a mask with `color`, producing premultiplied RGBA8 where the mask is the alpha.
pub fn cloud_sprite_premul(mask: &[u8], color: Rgb8) -> Vec<u8> {
    let mut out = Vec::with_capacity(mask.len() * 4);
    for &a in mask {
        let a16 = u16::from(a);
        out.extend_from_slice(&[
            mul_div255_u8(u16::from(color.r), a16),
            mul_div255_u8(u16::from(color.g), a16),
            mul_div255_u8(u16::from(color.b), a16),
            a,
        ]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/noise.rs"]
mod tests;
