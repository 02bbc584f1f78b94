//! RGBA colors and host color-string parsing

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// RGBA color with components in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Creates an opaque color from a `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xFF) as f32 / 255.0,
            ((hex >> 8) & 0xFF) as f32 / 255.0,
            (hex & 0xFF) as f32 / 255.0,
        )
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_rgb(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Converts to 8-bit sRGB components.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Converts the sRGB components to linear light (alpha unchanged).
    pub fn to_linear(&self) -> Self {
        let lin = |v: f32| {
            if v <= 0.04045 {
                v / 12.92
            } else {
                ((v + 0.055) / 1.055).powf(2.4)
            }
        };
        Self::new(lin(self.r), lin(self.g), lin(self.b), self.a)
    }

    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self::new(
            rgba[0] as f32 / 255.0,
            rgba[1] as f32 / 255.0,
            rgba[2] as f32 / 255.0,
            rgba[3] as f32 / 255.0,
        )
    }

    /// Parses a host color string.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and
    /// `rgba(r, g, b, a)` where the channels are 0-255 and alpha is 0.0-1.0.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorParseError(input.to_string()));
        }

        let lower = s.to_ascii_lowercase();
        let (body, has_alpha) = if let Some(rest) = lower.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = lower.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(ColorParseError(input.to_string()));
        };

        let body = body
            .strip_suffix(')')
            .ok_or_else(|| ColorParseError(input.to_string()))?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(ColorParseError(input.to_string()));
        }

        let channel = |p: &str| -> Result<f32, ColorParseError> {
            p.parse::<u8>()
                .map(|v| v as f32 / 255.0)
                .map_err(|_| ColorParseError(input.to_string()))
        };

        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = if has_alpha {
            let a = parts[3]
                .parse::<f32>()
                .map_err(|_| ColorParseError(input.to_string()))?;
            if !(0.0..=1.0).contains(&a) {
                return Err(ColorParseError(input.to_string()));
            }
            a
        } else {
            1.0
        };

        Ok(Self::new(r, g, b, a))
    }

    /// Formats as `#rrggbb` (or `#rrggbbaa` when translucent).
    pub fn to_hex_string(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Color::from_rgba8([nibble(0)?, nibble(1)?, nibble(2)?, 255]))
        }
        6 => Some(Color::from_rgba8([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Color::from_rgba8([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

/// A color string that could not be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid color string: {0:?}")]
pub struct ColorParseError(pub String);
