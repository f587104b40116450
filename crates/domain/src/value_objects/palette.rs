//! Named color themes for character and network formations.

use serde::Serialize;

use super::color::Rgb;

/// A named, non-empty list of colors. Indexing wraps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    pub name: &'static str,
    pub colors: Vec<Rgb>,
}

impl Palette {
    fn from_hex(name: &'static str, hex: &[u32]) -> Self {
        Self {
            name,
            colors: hex.iter().copied().map(Rgb::from_u32).collect(),
        }
    }

    /// Color for an arbitrary category index.
    pub fn color(&self, index: usize) -> Rgb {
        if self.colors.is_empty() {
            return Rgb::WHITE;
        }
        self.colors[index % self.colors.len()]
    }
}

const THEME_HEX: [(&str, [u32; 5]); 4] = [
    ("天庭金辉", [0xFFD700, 0xFF8C00, 0xFF4500, 0xDC143C, 0xB8860B]),
    ("佛光普照", [0x4F46E5, 0x7C3AED, 0xC026D3, 0xDB2777, 0x8B5CF6]),
    ("妖魔鬼怪", [0x10B981, 0xA3E635, 0xFACC15, 0xFB923C, 0x4ADE80]),
    ("取经路上", [0xEC4899, 0x8B5CF6, 0x6366F1, 0x3B82F6, 0xA855F7]),
];

const NETWORK_HEX: [(&str, [u32; 5]); 4] = [
    ("violet", [0x4F46E5, 0x7C3AED, 0xC026D3, 0xDB2777, 0x8B5CF6]),
    ("ember", [0xF59E0B, 0xF97316, 0xDC2626, 0x7F1D1D, 0xFBBF24]),
    ("pink-blue", [0xEC4899, 0x8B5CF6, 0x6366F1, 0x3B82F6, 0xA855F7]),
    ("lime", [0x10B981, 0xA3E635, 0xFACC15, 0xFB923C, 0x4ADE80]),
];

/// Themes for character formations.
pub fn themes() -> Vec<Palette> {
    THEME_HEX
        .iter()
        .map(|(name, hex)| Palette::from_hex(name, hex))
        .collect()
}

/// Themes for the abstract network formations.
pub fn network_palettes() -> Vec<Palette> {
    NETWORK_HEX
        .iter()
        .map(|(name, hex)| Palette::from_hex(name, hex))
        .collect()
}

pub fn theme_count() -> usize {
    THEME_HEX.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_index_wraps() {
        let themes = themes();
        assert_eq!(themes.len(), theme_count());
        let gold = &themes[0];
        assert_eq!(gold.color(0), gold.color(5));
        assert_eq!(gold.color(0), Rgb::from_u32(0xFFD700));
    }

    #[test]
    fn empty_palette_falls_back_to_white() {
        let empty = Palette {
            name: "empty",
            colors: Vec::new(),
        };
        assert_eq!(empty.color(3), Rgb::WHITE);
    }
}
