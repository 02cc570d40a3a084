//! # Scene Configuration
//!
//! Everything tunable about the scene, loaded from a TOML file. Every field
//! has a default, so a file only needs the values it changes:
//!
//! ```toml
//! [galaxy]
//! count = 20000
//! branches = 5
//! inside_color = "#ff6030"
//!
//! [visibility]
//! show_duck = false
//! ```

use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::galaxy::GalaxyParameters;

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Visibility toggles for already-inserted objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visibility {
    pub show_duck: bool,
    pub show_fox: bool,
    pub show_galaxy: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            show_duck: true,
            show_fox: true,
            show_galaxy: true,
        }
    }
}

/// Model files resolved at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    /// Skeletal model; its third clip plays on a loop
    pub fox: PathBuf,
    /// Static model that grows on hover
    pub duck: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            fox: PathBuf::from("assets/models/Fox/glTF/Fox.gltf"),
            duck: PathBuf::from("assets/models/Duck/glTF-Binary/Duck.glb"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Galaxy Scene".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

/// Mouse wheel to scroll offset mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Pixels scrolled per wheel line
    pub pixels_per_line: f32,
    /// Scroll range in viewport heights
    pub max_pages: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            pixels_per_line: 60.0,
            max_pages: 2.5,
        }
    }
}

/// Top-level scene configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub galaxy: GalaxyParameters,
    pub visibility: Visibility,
    pub assets: AssetPaths,
    pub window: WindowConfig,
    pub scroll: ScrollConfig,
}

impl SceneConfig {
    /// Loads and validates a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut config: SceneConfig = toml::from_str(contents)?;
        config.validate();
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Clamps out-of-domain values, logging each one changed
    pub fn validate(&mut self) {
        let sanitized = self.galaxy.sanitized();
        if sanitized.branches != self.galaxy.branches {
            warn!("galaxy.branches {} clamped to {}", self.galaxy.branches, sanitized.branches);
        }
        if sanitized.radius != self.galaxy.radius {
            warn!("galaxy.radius {} clamped to {}", self.galaxy.radius, sanitized.radius);
        }
        if sanitized.size != self.galaxy.size {
            warn!("galaxy.size {} clamped to {}", self.galaxy.size, sanitized.size);
        }
        if sanitized.spin != self.galaxy.spin {
            warn!("galaxy.spin {} replaced with {}", self.galaxy.spin, sanitized.spin);
        }
        if sanitized.randomness != self.galaxy.randomness {
            warn!(
                "galaxy.randomness {} clamped to {}",
                self.galaxy.randomness, sanitized.randomness
            );
        }
        if sanitized.randomness_power != self.galaxy.randomness_power {
            warn!(
                "galaxy.randomness_power {} clamped to {}",
                self.galaxy.randomness_power, sanitized.randomness_power
            );
        }
        self.galaxy = sanitized;

        if !(self.scroll.pixels_per_line > 0.0) {
            warn!("scroll.pixels_per_line must be positive, using default");
            self.scroll.pixels_per_line = ScrollConfig::default().pixels_per_line;
        }
        if !(self.scroll.max_pages >= 0.0) {
            warn!("scroll.max_pages must not be negative, using 0");
            self.scroll.max_pages = 0.0;
        }
        self.window.width = self.window.width.max(1);
        self.window.height = self.window.height.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::Rgb;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = SceneConfig::from_toml_str("").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.galaxy.count, 1000);
        assert_eq!(config.galaxy.inside_color.to_hex(), "#ffea00");
        assert_eq!(config.galaxy.outside_color.to_hex(), "#be0aff");
    }

    #[test]
    fn test_partial_file_overrides_fields() {
        let config = SceneConfig::from_toml_str(
            r##"
            [galaxy]
            count = 20000
            branches = 5
            inside_color = "#ff6030"

            [visibility]
            show_duck = false
            "##,
        )
        .unwrap();

        assert_eq!(config.galaxy.count, 20000);
        assert_eq!(config.galaxy.branches, 5);
        assert_eq!(config.galaxy.radius, 3.0);
        assert_eq!(config.galaxy.inside_color, Rgb::from_hex("#ff6030").unwrap());
        assert!(!config.visibility.show_duck);
        assert!(config.visibility.show_fox);
    }

    #[test]
    fn test_out_of_domain_values_are_clamped() {
        let config = SceneConfig::from_toml_str(
            r#"
            [galaxy]
            branches = 0
            randomness = -1.0
            "#,
        )
        .unwrap();

        assert_eq!(config.galaxy.branches, 1);
        assert_eq!(config.galaxy.randomness, 0.0);
    }

    #[test]
    fn test_nan_spin_is_replaced() {
        let config = SceneConfig::from_toml_str(
            r#"
            [galaxy]
            spin = nan
            "#,
        )
        .unwrap();

        assert_eq!(config.galaxy.spin, 0.0);
    }

    #[test]
    fn test_bad_color_is_a_parse_error() {
        let result = SceneConfig::from_toml_str(
            r#"
            [galaxy]
            inside_color = "red"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SceneConfig::load("does/not/exist.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = SceneConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(SceneConfig::from_toml_str(&text).unwrap(), config);
    }
}
