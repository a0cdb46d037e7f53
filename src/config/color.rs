use crate::foundation::core::Rgb8;
use serde::{Deserialize, Serialize};

impl Rgb8 {
    /// Parses `#RRGGBB`, `RRGGBB`, or `#RRGGBBAA` (alpha is ignored).
    pub fn from_hex(s: &str) -> Result<Self, String> {
        parse_hex(s)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => {
                if v.len() != 3 {
                    return Err(serde::de::Error::custom(
                        "rgb array must have len 3 ([r,g,b], 0..=255)",
                    ));
                }
                let c = |x: f64| x.clamp(0.0, 255.0).round() as u8;
                Ok(Rgb8::new(c(v[0]), c(v[1]), c(v[2])))
            }
        }
    }
}

fn parse_hex(s: &str) -> Result<Rgb8, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() || (s.len() != 6 && s.len() != 8) {
        return Err("hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned());
    }

    Ok(Rgb8::new(
        hex_byte(&s[0..2])?,
        hex_byte(&s[2..4])?,
        hex_byte(&s[4..6])?,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/config/color.rs"]
mod tests;
