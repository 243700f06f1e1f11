/*
 * This module provides platform-agnostic styling primitives used by both the
 * page-building code and the framework. These definitions are free of any
 * Win32 or OS-specific details so they can be compiled on any target. They
 * describe colors, fonts, per-control styles and the theme palette that
 * custom painting and the dialog adapter draw with.
 */

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /*
     * Parses `#RRGGBB` (the leading `#` is optional). Returns `None` for any
     * other shape rather than guessing at shorthand forms.
     */
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::from_hex(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{text}', expected #RRGGBB")))
    }
}

/*
 * Defines the weight (e.g., boldness) of a font.
 */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/*
 * Describes a font by family and point size. Conversion to a pixel height
 * happens at creation time against the DPI of the window the font is for.
 */
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FontDescription {
    pub family: String,
    pub point_size: i32,
    pub weight: FontWeight,
}

impl FontDescription {
    pub fn new(family: impl Into<String>, point_size: i32) -> Self {
        Self {
            family: family.into(),
            point_size,
            weight: FontWeight::Normal,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }
}

impl Default for FontDescription {
    fn default() -> Self {
        Self::new("Segoe UI", 9)
    }
}

/*
 * Per-control style overrides. Everything is optional so a control only
 * overrides the aspects of the theme it cares about.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlStyle {
    pub font: Option<FontDescription>,
    pub text_color: Option<Color>,
    pub background_color: Option<Color>,
    pub border_color: Option<Color>,
}

/*
 * The palette custom painting draws with. Hot, pressed and disabled variants
 * are optional: when absent they are derived from `button_face`.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub border: Color,
    pub title_bar: Color,
    pub title_text: Color,
    pub button_face: Color,
    pub button_text: Color,
    pub button_border: Color,
    pub button_hot: Option<Color>,
    pub button_pressed: Option<Color>,
    pub button_disabled: Option<Color>,
    pub input_background: Color,
    pub accent: Color,
    pub button_corner_radius: i32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::rgb(30, 30, 30),
            text: Color::rgb(220, 220, 220),
            border: Color::rgb(70, 70, 70),
            title_bar: Color::rgb(45, 45, 45),
            title_text: Color::rgb(235, 235, 235),
            button_face: Color::rgb(60, 60, 60),
            button_text: Color::rgb(230, 230, 230),
            button_border: Color::rgb(90, 90, 90),
            button_hot: None,
            button_pressed: None,
            button_disabled: None,
            input_background: Color::rgb(50, 50, 50),
            accent: Color::rgb(78, 201, 176),
            button_corner_radius: 6,
        }
    }
}
