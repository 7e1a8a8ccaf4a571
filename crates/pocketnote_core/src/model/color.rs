//! Note palette keys.
//!
//! Notes persist a palette key (`"yellow"`), not a concrete color value. The
//! view layer maps keys to theme colors.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Palette key used when a note has no usable color.
pub const DEFAULT_NOTE_COLOR: &str = "yellow";

/// Fixed palette offered to notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Yellow,
    Red,
    Green,
    Blue,
    Purple,
    Orange,
}

impl NoteColor {
    /// Every palette entry in display order.
    pub const ALL: [NoteColor; 6] = [
        NoteColor::Yellow,
        NoteColor::Red,
        NoteColor::Green,
        NoteColor::Blue,
        NoteColor::Purple,
        NoteColor::Orange,
    ];

    /// Returns the persisted key for this entry.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    /// Parses a persisted key. Matching is case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.as_str() == value)
    }
}

impl Display for NoteColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns whether `value` is a raw hex color left over from older data.
pub fn is_raw_hex_color(value: &str) -> bool {
    value.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::{is_raw_hex_color, NoteColor, DEFAULT_NOTE_COLOR};

    #[test]
    fn default_color_matches_default_key() {
        assert_eq!(NoteColor::default().as_str(), DEFAULT_NOTE_COLOR);
    }

    #[test]
    fn parse_accepts_every_palette_key_only() {
        for color in NoteColor::ALL {
            assert_eq!(NoteColor::parse(color.as_str()), Some(color));
        }
        assert_eq!(NoteColor::parse("Yellow"), None);
        assert_eq!(NoteColor::parse("#ff0000"), None);
    }

    #[test]
    fn hex_marker_detection() {
        assert!(is_raw_hex_color("#74b9ff"));
        assert!(!is_raw_hex_color("blue"));
        assert!(!is_raw_hex_color(""));
    }
}
