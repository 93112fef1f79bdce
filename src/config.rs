//! Editor configuration.
//!
//! Settings are read from TOML (or JSON) files. Every field has a default so a
//! partial file only overrides what it names.

use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable page and interaction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Width of a plan sheet page in millimetres
    pub page_width_mm: f32,
    /// Height of a plan sheet page in millimetres
    pub page_height_mm: f32,
    /// Screen pixels per page millimetre
    pub pixels_per_mm: f32,
    /// A diagram may never be resized shorter than this on the page
    pub min_diagram_height_mm: f32,
    /// Screen position of the page's top-left corner
    pub screen_offset: (f32, f32),
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            page_width_mm: 380.0,
            page_height_mm: 260.0,
            pixels_per_mm: 4.0,
            min_diagram_height_mm: 10.0,
            screen_offset: (0.0, 0.0),
        }
    }
}

impl EditorConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, EditorError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads a configuration file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)?;
        let config = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&s)?
        } else {
            Self::from_toml_str(&s)?
        };
        log::debug!("loaded editor config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EditorConfig::from_toml_str("pixels_per_mm = 2.5\n").unwrap();
        assert_eq!(config.pixels_per_mm, 2.5);
        assert_eq!(config.page_width_mm, 380.0);
        assert_eq!(config.min_diagram_height_mm, 10.0);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = EditorConfig::from_toml_str("pixels_per_mm = \"wide\"").unwrap_err();
        assert!(matches!(err, EditorError::Config(_)));
    }

    #[test]
    fn load_reads_json_by_extension() {
        let path = std::env::temp_dir().join(format!("plansheet-config-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"page_height_mm": 200.0}"#).unwrap();
        let config = EditorConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.page_height_mm, 200.0);
        assert_eq!(config.pixels_per_mm, 4.0);
    }
}
