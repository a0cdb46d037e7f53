use crate::foundation::error::{SmokeError, SmokeResult};

pub use kurbo::{Point, Rect, Vec2};

/// Logical drawing size shared by the effect layer and the composite output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> SmokeResult<Self> {
        if width == 0 || height == 0 {
            return Err(SmokeError::validation("viewport width/height must be > 0"));
        }
        // vello_cpu pixmaps are addressed with u16 coordinates.
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(SmokeError::validation(format!(
                "viewport {width}x{height} exceeds the 65535px raster limit"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    pub fn byte_len(self) -> usize {
        self.pixel_count().saturating_mul(4)
    }

    pub fn as_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

impl std::str::FromStr for Viewport {
    type Err = SmokeError;

    /// Parses `WIDTHxHEIGHT`, e.g. `1920x1080`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| SmokeError::validation(format!("viewport '{s}' must be WxH")))?;
        let w = w
            .trim()
            .parse::<u32>()
            .map_err(|e| SmokeError::validation(format!("viewport width '{w}': {e}")))?;
        let h = h
            .trim()
            .parse::<u32>()
            .map_err(|e| SmokeError::validation(format!("viewport height '{h}': {e}")))?;
        Self::new(w, h)
    }
}

/// Straight (non-premultiplied) RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Premultiplied RGBA8 for this color at `alpha` in [0,1].
    pub fn premul_with_alpha(self, alpha: f32) -> [u8; 4] {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u16;
        [
            crate::foundation::math::mul_div255_u8(u16::from(self.r), a),
            crate::foundation::math::mul_div255_u8(u16::from(self.g), a),
            crate::foundation::math::mul_div255_u8(u16::from(self.b), a),
            a as u8,
        ]
    }
}

/// Closed interval `[min, max]` used for uniform sampling of spawn attributes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub const fn fixed(v: f64) -> Self {
        Self { min: v, max: v }
    }

    /// Returns the range with `min <= max`, swapping inverted bounds.
    ///
    /// A non-finite bound collapses onto the other one; if both are non-finite `fallback` is used.
    pub fn normalized_or(self, fallback: ValueRange) -> Self {
        match (self.min.is_finite(), self.max.is_finite()) {
            (true, true) => {
                if self.min <= self.max {
                    self
                } else {
                    Self::new(self.max, self.min)
                }
            }
            (true, false) => Self::fixed(self.min),
            (false, true) => Self::fixed(self.max),
            (false, false) => fallback.normalized_or(Self::fixed(0.0)),
        }
    }

    pub fn contains(self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }

    pub fn span(self) -> f64 {
        self.max - self.min
    }

    pub fn clamp_to(self, lo: f64, hi: f64) -> Self {
        Self::new(self.min.clamp(lo, hi), self.max.clamp(lo, hi))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
