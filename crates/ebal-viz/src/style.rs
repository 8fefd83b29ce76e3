//! Colors, palettes, and the ordering/styling configuration.

use std::collections::HashMap;

use ebal_core::FlowKey;
use serde::{Deserialize, Serialize};

use crate::error::{VizError, VizResult};

/// An RGB color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Parses `#rrggbb` (leading `#` optional).
    pub fn from_hex(literal: &str) -> VizResult<Self> {
        let digits = literal.strip_prefix('#').unwrap_or(literal);
        if digits.len() != 6 {
            return Err(VizError::BadColor(literal.to_string()));
        }
        let channel = |range| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| VizError::BadColor(literal.to_string()))
        };
        Ok(Color {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

/// Fallback palette cycled through for flows without an explicit color.
pub const DEFAULT_PALETTE: [Color; 8] = [
    Color::rgb(0x5b, 0x5b, 0xae), // wind blue
    Color::rgb(0xff, 0xde, 0x32), // pv yellow
    Color::rgb(0x63, 0x6f, 0x6b), // plant gray
    Color::rgb(0x42, 0xc7, 0x7a), // storage green
    Color::rgb(0xce, 0x4a, 0xff), // demand purple
    Color::rgb(0x20, 0xb4, 0xb6), // teal
    Color::rgb(0xf2, 0x22, 0x22), // excess red
    Color::rgb(0x55, 0x55, 0x55), // slack gray
];

/// Explicit color overrides plus the fallback palette.
///
/// Two flows share a color only when the overrides say so; fallback
/// assignment skips colors that are already taken for as long as the
/// palette lasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    pub overrides: HashMap<FlowKey, Color>,
    pub palette: Vec<Color>,
}

impl Default for StyleSpec {
    fn default() -> Self {
        StyleSpec {
            overrides: HashMap::new(),
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl StyleSpec {
    pub fn with_color(mut self, key: FlowKey, color: Color) -> Self {
        self.overrides.insert(key, color);
        self
    }

    pub fn with_palette(mut self, palette: Vec<Color>) -> Self {
        self.palette = palette;
        self
    }
}

/// Explicit draw order for in- and outflows.
///
/// Keys not listed are appended in the balance view's encounter order;
/// listed keys absent from the view are ignored without error, so one
/// order spec can serve several symmetric buses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderSpec {
    pub inorder: Vec<FlowKey>,
    pub outorder: Vec<FlowKey>,
}

impl OrderSpec {
    pub fn with_inorder(mut self, keys: Vec<FlowKey>) -> Self {
        self.inorder = keys;
        self
    }

    pub fn with_outorder(mut self, keys: Vec<FlowKey>) -> Self {
        self.outorder = keys;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let color = Color::from_hex("#42c77a").unwrap();
        assert_eq!(color, Color::rgb(0x42, 0xc7, 0x7a));
        assert_eq!(Color::from_hex("42c77a").unwrap(), color);
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!(Color::from_hex("#42c7").is_err());
        assert!(Color::from_hex("#42c77g").is_err());
    }

    #[test]
    fn default_palette_has_no_duplicates() {
        for (i, a) in DEFAULT_PALETTE.iter().enumerate() {
            for b in &DEFAULT_PALETTE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
