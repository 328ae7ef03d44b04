//! Config color stored as `"#RRGGBB"` or `"#RRGGBBAA"` in JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Straight (non-premultiplied) 8-bit RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from a gray level and alpha in `0.0..=1.0`.
    pub fn gray(white: f32, alpha: f32) -> Self {
        let v = unit_to_u8(white);
        Self::rgba(v, v, v, unit_to_u8(alpha))
    }

    /// Builds a color from unit-range components.
    pub fn from_unit(r: f32, g: f32, b: f32, alpha: f32) -> Self {
        Self::rgba(
            unit_to_u8(r),
            unit_to_u8(g),
            unit_to_u8(b),
            unit_to_u8(alpha),
        )
    }

    /// Same color with a different alpha in `0.0..=1.0`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: unit_to_u8(alpha),
            ..self
        }
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Error for malformed color strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hex color: {}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for HexColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(err)?;
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
        let a = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_rgba() {
        assert_eq!(
            "#4A9EFF".parse::<HexColor>().unwrap(),
            HexColor::rgb(74, 158, 255)
        );
        assert_eq!(
            "#c2d9ff4d".parse::<HexColor>().unwrap(),
            HexColor::rgba(194, 217, 255, 77)
        );
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "#", "123456", "#12345", "#GG0000", "#ééé"] {
            assert!(bad.parse::<HexColor>().is_err(), "{bad}");
        }
    }

    #[test]
    fn display_omits_opaque_alpha() {
        assert_eq!(HexColor::rgb(26, 26, 26).to_string(), "#1A1A1A");
        assert_eq!(HexColor::rgba(26, 26, 26, 128).to_string(), "#1A1A1A80");
    }

    #[test]
    fn unit_constructors_round() {
        assert_eq!(HexColor::gray(0.1, 1.0), HexColor::rgb(26, 26, 26));
        assert_eq!(HexColor::rgb(0, 0, 0).with_alpha(0.3).a, 77);
        assert_eq!(HexColor::from_unit(2.0, -1.0, 0.5, 1.0), HexColor::rgb(255, 0, 128));
    }

    #[test]
    fn serde_uses_hex_strings() {
        let c = HexColor::rgba(77, 122, 204, 77);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#4D7ACC4D\"");
        assert_eq!(serde_json::from_str::<HexColor>(&json).unwrap(), c);
        assert!(serde_json::from_str::<HexColor>("\"red\"").is_err());
    }
}
