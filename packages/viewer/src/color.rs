use std::fmt;

use common::Category;

/// 24-bit RGB display color, formatted as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 3]);

/// Fallback color for uncategorized meshes.
pub const DEFAULT_COLOR: Color = Color([0xFF, 0xD7, 0x00]); // gold

impl Color {
    /// Parse a `#RRGGBB` hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self([r, g, b]))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Default display color for a category.
///
/// Fixed lookup: the same category always yields the same color, so category
/// changes re-derive deterministically.
pub fn default_color(category: Option<Category>) -> Color {
    match category {
        Some(Category::Upper) => Color([0xFF, 0xD7, 0x00]), // gold
        Some(Category::Lower) => Color([0x87, 0xCE, 0xEB]), // sky blue
        Some(Category::Bar) => Color([0xC0, 0xC0, 0xC0]),   // silver
        Some(Category::Gum) => Color([0xFF, 0x9E, 0x9E]),   // pink
        None => DEFAULT_COLOR,
    }
}
