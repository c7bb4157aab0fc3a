//! Configuration file support for mapmark.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/mapmark/config.toml`. Settings include the zoom bounds, the base
//! image overlay, layer appearance and the hold keys that unlock panning and zooming.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

pub use enums::ColorSpec;
pub use types::{CircleConfig, KeysConfig, MarkerConfig, OverlayConfig, PathConfig, ViewConfig};

use crate::geo::{FitRule, ImageRef};
use crate::input::Key;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [view]
/// min_zoom = -2
/// max_zoom = 5
///
/// [overlay]
/// image = "/srv/maps/floor-2.png"
/// bounds = [810, 1100]
///
/// [circle]
/// radius = 40
/// fill_color = "#257ef4"
///
/// [keys]
/// zoom = "z"
/// pan = "Alt"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Zoom bounds, view fitting and viewport size
    #[serde(default)]
    pub view: ViewConfig,

    /// Base image overlay
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// Pin marker appearance
    #[serde(default)]
    pub marker: MarkerConfig,

    /// Circle appearance
    #[serde(default)]
    pub circle: CircleConfig,

    /// Polygon and trace appearance
    #[serde(default)]
    pub path: PathConfig,

    /// Hold keys for zooming and panning
    #[serde(default)]
    pub keys: KeysConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value (or replaced by the
    /// default) and a warning is logged.
    ///
    /// Validated ranges:
    /// - `view.min_zoom` <= `view.max_zoom` (swapped otherwise)
    /// - `view.default_zoom`, `view.far_zoom`: within the zoom bounds
    /// - `view.fit_threshold`: positive
    /// - `view.viewport_*`: 16 - 8192
    /// - `overlay.bounds`: positive
    /// - `circle.radius`: at least 1.0
    /// - `path.weight`: 0.5 - 20.0
    fn validate_and_clamp(&mut self) {
        let view = &mut self.view;

        if !view.min_zoom.is_finite() || !view.max_zoom.is_finite() {
            warn!("Non-finite zoom bounds, falling back to defaults");
            view.min_zoom = types::default_min_zoom();
            view.max_zoom = types::default_max_zoom();
        }

        if view.min_zoom > view.max_zoom {
            warn!(
                "min_zoom {:.1} is above max_zoom {:.1}, swapping",
                view.min_zoom, view.max_zoom
            );
            std::mem::swap(&mut view.min_zoom, &mut view.max_zoom);
        }

        for (name, zoom, fallback) in [
            ("default_zoom", &mut view.default_zoom, types::default_zoom()),
            ("far_zoom", &mut view.far_zoom, types::default_far_zoom()),
        ] {
            if !zoom.is_finite() {
                *zoom = fallback;
            }
            if !(view.min_zoom..=view.max_zoom).contains(zoom) {
                warn!(
                    "Invalid {name} {:.1}, clamping to {:.1}-{:.1} range",
                    zoom, view.min_zoom, view.max_zoom
                );
                *zoom = zoom.clamp(view.min_zoom, view.max_zoom);
            }
        }

        if !(view.fit_threshold > 0.0) {
            warn!(
                "Invalid fit_threshold {:.1}, falling back to {:.1}",
                view.fit_threshold,
                types::default_fit_threshold()
            );
            view.fit_threshold = types::default_fit_threshold();
        }

        for (name, size) in [
            ("viewport_width", &mut view.viewport_width),
            ("viewport_height", &mut view.viewport_height),
        ] {
            if !(16..=8192).contains(size) {
                warn!("Invalid {name} {size}, clamping to 16-8192 range");
                *size = (*size).clamp(16, 8192);
            }
        }

        if !self.overlay.bounds.iter().all(|b| b.is_finite() && *b > 0.0) {
            warn!(
                "Invalid overlay bounds {:?}, falling back to {:?}",
                self.overlay.bounds,
                types::default_overlay_bounds()
            );
            self.overlay.bounds = types::default_overlay_bounds();
        }

        if !(self.circle.radius >= 1.0) {
            warn!(
                "Invalid circle radius {:.1}, falling back to {:.1}",
                self.circle.radius,
                types::default_circle_radius()
            );
            self.circle.radius = types::default_circle_radius();
        }

        if !(0.5..=20.0).contains(&self.path.weight) {
            warn!(
                "Invalid path weight {:.1}, clamping to 0.5-20.0 range",
                self.path.weight
            );
            self.path.weight = if self.path.weight.is_nan() {
                types::default_path_weight()
            } else {
                self.path.weight.clamp(0.5, 20.0)
            };
        }

        for (name, spec, fallback) in [
            (
                "marker.color",
                &mut self.marker.color,
                types::default_marker_color(),
            ),
            (
                "circle.color",
                &mut self.circle.color,
                types::default_path_color(),
            ),
            (
                "circle.fill_color",
                &mut self.circle.fill_color,
                types::default_fill_color(),
            ),
            ("path.color", &mut self.path.color, types::default_path_color()),
            (
                "path.fill_color",
                &mut self.path.fill_color,
                types::default_fill_color(),
            ),
        ] {
            if spec.try_to_color().is_none() {
                warn!("Invalid {name} {:?}, falling back to default", spec);
                *spec = fallback;
            }
        }

        for (name, key, fallback) in [
            ("keys.zoom", &mut self.keys.zoom, types::default_zoom_key()),
            ("keys.pan", &mut self.keys.pan, types::default_pan_key()),
        ] {
            if matches!(Key::parse(key), Key::Unknown) {
                warn!("Invalid {name} '{key}', falling back to '{fallback}'");
                *key = fallback;
            }
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/mapmark/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("mapmark");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if the file is missing.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let config = Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(config_str: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(config_str)?;
        config.validate_and_clamp();
        Ok(config)
    }

    /// Serializes the configuration to TOML and writes it to `config_path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Rule used to derive the initial view from the base image bounds.
    pub fn fit_rule(&self) -> FitRule {
        FitRule {
            threshold: self.view.fit_threshold,
            default_zoom: self.view.default_zoom,
            far_zoom: self.view.far_zoom,
        }
    }

    /// The configured base image.
    pub fn base_image(&self) -> ImageRef {
        ImageRef::new(self.overlay.image.clone(), self.overlay.bounds)
    }

    pub fn zoom_key(&self) -> Key {
        Key::parse(&self.keys.zoom)
    }

    pub fn pan_key(&self) -> Key {
        Key::parse(&self.keys.pan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::Color;

    #[test]
    fn defaults_match_stock_widget() {
        let config = Config::default();
        assert_eq!(config.view.min_zoom, -2.0);
        assert_eq!(config.view.max_zoom, 5.0);
        assert_eq!(config.overlay.image, "/starter.png");
        assert_eq!(config.overlay.bounds, [810.0, 1100.0]);
        assert_eq!(config.circle.radius, 40.0);
        assert_eq!(config.zoom_key(), Key::Char('z'));
        assert_eq!(config.pan_key(), Key::Alt);
    }

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn swaps_inverted_zoom_bounds_and_clamps_fit_zooms() {
        let config = Config::from_toml(
            r#"
            [view]
            min_zoom = 4
            max_zoom = 0
            default_zoom = -1
            far_zoom = 9
            "#,
        )
        .unwrap();
        assert_eq!(config.view.min_zoom, 0.0);
        assert_eq!(config.view.max_zoom, 4.0);
        assert_eq!(config.view.default_zoom, 0.0);
        assert_eq!(config.view.far_zoom, 4.0);
    }

    #[test]
    fn replaces_invalid_values() {
        let config = Config::from_toml(
            r#"
            [overlay]
            bounds = [0, 500]

            [circle]
            radius = 0
            fill_color = "not-a-color"

            [path]
            weight = 100

            [keys]
            zoom = ""
            "#,
        )
        .unwrap();
        assert_eq!(config.overlay.bounds, [810.0, 1100.0]);
        assert_eq!(config.circle.radius, 40.0);
        assert_eq!(
            config.circle.fill_color.to_color(),
            Color::from_hex("#257ef4").unwrap()
        );
        assert_eq!(config.path.weight, 20.0);
        assert_eq!(config.keys.zoom, "z");
    }

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.overlay.image = "floor.png".into();
        config.keys.pan = "Shift".into();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn invalid_toml_reports_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[view\nmin_zoom = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn schema_lists_sections() {
        let schema = serde_json::to_value(Config::json_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        for section in ["view", "overlay", "marker", "circle", "path", "keys"] {
            assert!(properties.contains_key(section), "missing {section}");
        }
    }
}
