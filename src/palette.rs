// Color palette for chart categories

use anyhow::{anyhow, Result};
use std::fmt;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` hex string
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| anyhow!("Color '{}' must start with '#'", hex))?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(anyhow!("Color '{}' must have six hex digits", hex));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| anyhow!("Color '{}' contains invalid hex digits", hex))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Shift every channel by `factor * 255`, clamped to the valid range.
    /// Negative factors darken, positive factors lighten.
    pub fn adjust_brightness(self, factor: f64) -> Self {
        let shift = |c: u8| -> u8 {
            (c as f64 + factor * 255.0).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: shift(self.r),
            g: shift(self.g),
            b: shift(self.b),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Ordered set of visually distinct colors, handed out without replacement
/// and cycling once exhausted.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<Rgb>,
}

impl ColorPalette {
    pub fn new(colors: Vec<Rgb>) -> Result<Self> {
        if colors.is_empty() {
            return Err(anyhow!("A color palette needs at least one color"));
        }
        Ok(Self { colors })
    }

    /// The ten-color categorical palette
    pub fn category10() -> Self {
        Self {
            colors: vec![
                Rgb::new(0x1f, 0x77, 0xb4),
                Rgb::new(0xff, 0x7f, 0x0e),
                Rgb::new(0x2c, 0xa0, 0x2c),
                Rgb::new(0xd6, 0x27, 0x28),
                Rgb::new(0x94, 0x67, 0xbd),
                Rgb::new(0x8c, 0x56, 0x4b),
                Rgb::new(0xe3, 0x77, 0xc2),
                Rgb::new(0x7f, 0x7f, 0x7f),
                Rgb::new(0xbc, 0xbd, 0x22),
                Rgb::new(0x17, 0xbe, 0xcf),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for the `index`-th category
    pub fn color(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }

    /// First `count` colors in palette order, cycling past the palette size
    pub fn colors(&self, count: usize) -> Vec<Rgb> {
        (0..count).map(|i| self.color(i)).collect()
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::category10()
    }
}
