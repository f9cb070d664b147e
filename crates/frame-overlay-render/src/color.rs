use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque RGB color. Transparency is supplied separately at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid color {0:?}: expected #rgb or #rrggbb")]
pub struct ColorParseError(pub String);

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    /// Used for categories a palette does not know.
    pub const FALLBACK: Color = Color::rgb(0xff, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb`; the leading `#` is optional.
    pub fn parse_hex(s: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(err());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Color::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Color::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(err()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse_hex(&value)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

/// Resolves the display color of a detection from its category key.
pub trait ColorLookup {
    fn color_for(&self, category: &str) -> Color;
}

impl<F> ColorLookup for F
where
    F: Fn(&str) -> Color,
{
    fn color_for(&self, category: &str) -> Color {
        self(category)
    }
}

/// Category-to-color table with a fallback for unknown categories.
///
/// Keys are matched case-insensitively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPalette {
    colors: BTreeMap<String, Color>,
    fallback: Color,
}

impl Default for CategoryPalette {
    fn default() -> Self {
        Self {
            colors: BTreeMap::new(),
            fallback: Color::FALLBACK,
        }
    }
}

impl CategoryPalette {
    pub fn new(fallback: Color) -> Self {
        Self {
            colors: BTreeMap::new(),
            fallback,
        }
    }

    /// Standard road-asset categories shown on the survey dashboard.
    pub fn road_assets() -> Self {
        [
            ("Signage", Color::rgb(0x1e, 0x90, 0xff)),
            ("Street Light", Color::rgb(0xff, 0xd7, 0x00)),
            ("Traffic Signal", Color::rgb(0xff, 0x8c, 0x00)),
            ("Guardrail", Color::rgb(0x80, 0x80, 0x80)),
            ("Road Marking", Color::rgb(0xff, 0xff, 0xff)),
            ("Kerb", Color::rgb(0xa0, 0x52, 0x2d)),
            ("Manhole", Color::rgb(0x6a, 0x5a, 0xcd)),
            ("Pothole", Color::rgb(0xdc, 0x14, 0x3c)),
            ("Crack", Color::rgb(0xff, 0x45, 0x00)),
            ("Vegetation", Color::rgb(0x22, 0x8b, 0x22)),
        ]
        .into_iter()
        .fold(Self::default(), |p, (name, color)| p.with(name, color))
    }

    pub fn with(mut self, category: &str, color: Color) -> Self {
        self.insert(category, color);
        self
    }

    pub fn insert(&mut self, category: &str, color: Color) {
        self.colors.insert(category.to_lowercase(), color);
    }

    pub fn fallback(&self) -> Color {
        self.fallback
    }

    pub fn get(&self, category: &str) -> Option<Color> {
        // Tables loaded from JSON keep the caller's casing.
        self.colors
            .get(&category.to_lowercase())
            .or_else(|| {
                self.colors
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(category))
                    .map(|(_, c)| c)
            })
            .copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl ColorLookup for CategoryPalette {
    fn color_for(&self, category: &str) -> Color {
        self.get(category).unwrap_or(self.fallback)
    }
}
