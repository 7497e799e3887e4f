//! Trait colors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 8-bit RGBA color, serialized as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub fn to_hex(self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl std::str::FromStr for Rgba {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return Err(format!("expected #rrggbb or #rrggbbaa, got '{s}'"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("bad hex digits in '{s}'"))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 0xff },
        })
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_hex()
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Trait title → icon color, with a fallback for unlisted traits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitPalette {
    #[serde(default)]
    pub traits: BTreeMap<String, Rgba>,
    #[serde(default = "default_unknown")]
    pub unknown: Rgba,
}

fn default_unknown() -> Rgba {
    Rgba::WHITE
}

impl Default for TraitPalette {
    fn default() -> Self {
        let traits = [
            ("Pilot", Rgba::rgb(0xdb, 0x58, 0x56)),
            ("Engineer", Rgba::rgb(0xd5, 0xb6, 0x0a)),
            ("Scientist", Rgba::rgb(0x3f, 0x82, 0x9d)),
            ("Tourist", Rgba::rgb(0x5c, 0x8b, 0x15)),
        ]
        .into_iter()
        .map(|(name, color)| (name.to_string(), color))
        .collect();
        Self {
            traits,
            unknown: default_unknown(),
        }
    }
}

impl TraitPalette {
    pub fn color_for(&self, trait_title: &str) -> Rgba {
        self.traits.get(trait_title).copied().unwrap_or(self.unknown)
    }
}
