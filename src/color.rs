//! Colours for page backgrounds and inter-page separators.

use std::fmt;

use anyhow::{Result, bail};
use serde::Deserialize;

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Built-in colour names.
pub const NAMED: &[(&str, Color)] = &[
    ("gray", Color::rgb(0xbe, 0xbe, 0xbe)),
    ("grey", Color::rgb(0xbe, 0xbe, 0xbe)),
    ("dark-gray", Color::rgb(0x4d, 0x4d, 0x4d)),
    ("light-gray", Color::rgb(0xd3, 0xd3, 0xd3)),
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(0xff, 0xff, 0xff)),
];

/// Default colour name for page backgrounds and separators.
pub const DEFAULT_COLOR: &str = "gray";

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The neutral gray used when nothing is configured.
    pub const fn neutral_gray() -> Self {
        Self::rgb(0xbe, 0xbe, 0xbe)
    }

    /// Parse `#rgb`, `#rrggbb`, or a built-in name.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| anyhow::anyhow!("invalid hex colour '{text}'"));
        }
        match get(&text.to_ascii_lowercase()) {
            Some(c) => Ok(c),
            None => bail!("unknown colour '{text}'"),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::neutral_gray()
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Look up a built-in colour by name.
pub fn get(name: &str) -> Option<Color> {
    NAMED.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let r = channel(&hex[0..1])?;
            let g = channel(&hex[1..2])?;
            let b = channel(&hex[2..3])?;
            Some(Color::rgb(r * 0x11, g * 0x11, b * 0x11))
        }
        6 => Some(Color::rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}
