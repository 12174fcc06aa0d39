//! Conversion settings.
//!
//! Settings are plain public fields with sensible defaults, so callers can
//! either build a [`ConversionConfig`] in code or load it from a TOML file.

use anyhow::Context;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Mark colliders of locked terrain as passable for characters.
    pub locked_terrain_character_passable: bool,
    /// Mark the table surface collider as passable for characters.
    pub table_character_passable: bool,
    /// Smallest font size a text note is rendered with.
    pub min_font_size: f32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            locked_terrain_character_passable: false,
            table_character_passable: false,
            min_font_size: 4.0,
        }
    }
}

impl ConversionConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid conversion config")
    }
}
