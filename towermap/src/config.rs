//! Application configuration.
//!
//! The configuration is a JSON document. Every field is optional and falls back to the values of
//! [`AppConfig::default`], so an empty object `{}` is a valid configuration.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TowerMapError};
use crate::geo_box::GeoPoint;
use crate::pick::DEFAULT_MAX_CLICK_MOVE;
use crate::surface::MapOptions;
use crate::theme::{Theme, GEOJSON_STYLE_SET};

/// Environment variable with the basemap API key.
pub const API_KEY_ENV: &str = "TOWERMAP_API_KEY";
/// Base theme of the default theme.
pub const DEFAULT_BASE_THEME: &str = "resources/berlin_tilezen_effects_streets.json";

const TOWERS: &str = include_str!("../data/towers.geojson");
const COVERAGE: &str = include_str!("../data/coverage.geojson");

/// GeoJSON documents compiled into the crate, by overlay name.
pub fn embedded_dataset(name: &str) -> Option<&'static str> {
    match name {
        "towers" => Some(TOWERS),
        "coverage" => Some(COVERAGE),
        _ => None,
    }
}

/// Vector tile basemap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasemapConfig {
    /// Tile service URL without the tile path.
    pub base_url: String,
    /// Authentication code of the tile service.
    pub api_key: Option<String>,
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            base_url: "https://vector.hereapi.com/v2/vectortiles/base/mc".to_string(),
            api_key: None,
        }
    }
}

/// A GeoJSON overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Name of the data source.
    pub name: String,
    /// File to read. The document compiled in under the same name is used when not set.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Style set of the theme.
    #[serde(default = "default_style_set")]
    pub style_set: String,
}

fn default_style_set() -> String {
    GEOJSON_STYLE_SET.to_string()
}

impl OverlayConfig {
    /// Overlay with compiled in data.
    pub fn embedded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            style_set: default_style_set(),
        }
    }

    /// Reads the GeoJSON text of the overlay.
    pub fn read(&self) -> Result<Cow<'static, str>> {
        match &self.path {
            Some(path) => Ok(Cow::Owned(std::fs::read_to_string(path)?)),
            None => embedded_dataset(&self.name)
                .map(Cow::Borrowed)
                .ok_or_else(|| TowerMapError::DataSource {
                    name: self.name.clone(),
                    reason: "no path given and no embedded data with this name".to_string(),
                }),
        }
    }
}

/// Configuration of the map application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Initial camera target.
    pub target: GeoPoint,
    /// Initial zoom level.
    pub zoom_level: f64,
    /// Maximum camera tilt in degrees.
    pub max_tilt_deg: f64,
    /// Vector tile basemap.
    pub basemap: BasemapConfig,
    /// Overlays in registration order, bottom first.
    pub overlays: Vec<OverlayConfig>,
    /// Theme file. The built-in tower theme is used when not set.
    pub theme: Option<PathBuf>,
    /// Distance in pixels between the pointer and a feature within which the feature is hit.
    /// Used by engines that run the hit test themselves.
    pub pick_tolerance_px: f64,
    /// Distance in pixels the pointer may move along each axis between press and release of a
    /// click.
    pub max_click_move_px: f64,
    /// Dynamic property holding the name of the selected feature.
    pub selection_property: String,
    /// Id of the canvas element of the map.
    pub canvas_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target: GeoPoint::new(24.78280387878418, 60.204047014976714),
            zoom_level: 12.0,
            max_tilt_deg: 55.0,
            basemap: BasemapConfig::default(),
            overlays: vec![
                OverlayConfig::embedded("coverage"),
                OverlayConfig::embedded("towers"),
            ],
            theme: None,
            pick_tolerance_px: 5.0,
            max_click_move_px: DEFAULT_MAX_CLICK_MOVE,
            selection_property: "selection".to_string(),
            canvas_id: "mapCanvas".to_string(),
        }
    }
}

impl AppConfig {
    /// Parses a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a JSON configuration file. Relative overlay and theme paths are resolved against
    /// the directory of the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_json_str(&std::fs::read_to_string(path)?)?;

        let dir = path.parent().unwrap_or(Path::new("."));
        for overlay in &mut config.overlays {
            if let Some(overlay_path) = &mut overlay.path {
                *overlay_path = dir.join(&*overlay_path);
            }
        }
        if let Some(theme) = &mut config.theme {
            *theme = dir.join(&*theme);
        }

        Ok(config)
    }

    /// Takes the API key from the `TOWERMAP_API_KEY` environment variable if the configuration
    /// does not have one.
    pub fn with_api_key_from_env(self) -> Self {
        self.with_api_key_from(std::env::var(API_KEY_ENV).ok())
    }

    /// Sets the API key if the configuration does not have one.
    pub fn with_api_key_from(mut self, key: Option<String>) -> Self {
        let has_key = self
            .basemap
            .api_key
            .as_ref()
            .is_some_and(|k| !k.is_empty());
        if !has_key {
            if let Some(key) = key.filter(|k| !k.is_empty()) {
                self.basemap.api_key = Some(key);
            }
        }

        self
    }

    /// Theme of the map: the configured file, or the built-in tower theme.
    pub fn load_theme(&self) -> Result<Theme> {
        let theme = match &self.theme {
            Some(path) => Theme::load(path)?,
            None => Theme::tower_default(Some(DEFAULT_BASE_THEME.to_string())),
        };
        theme.validate()?;

        Ok(theme)
    }

    /// Options to construct the map engine with.
    pub fn map_options(&self) -> Result<MapOptions> {
        Ok(MapOptions {
            canvas_id: self.canvas_id.clone(),
            target: self.target,
            zoom_level: self.zoom_level,
            max_tilt_deg: self.max_tilt_deg,
            theme: self.load_theme()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = AppConfig::from_json_str("{}").expect("valid config");
        assert_eq!(config, AppConfig::default());

        assert_relative_eq!(config.target.lon, 24.78280387878418);
        assert_relative_eq!(config.target.lat, 60.204047014976714);
        assert_eq!(config.pick_tolerance_px, 5.0);
        assert_eq!(config.max_click_move_px, 5.0);
        assert_eq!(config.overlays[0].name, "coverage");
        assert_eq!(config.overlays[1].name, "towers");
    }

    #[test]
    fn partial_document() {
        let config = AppConfig::from_json_str(
            r#"{"zoom_level": 9, "basemap": {"api_key": "abc"}, "overlays": [{"name": "towers"}]}"#,
        )
        .expect("valid config");

        assert_eq!(config.zoom_level, 9.0);
        assert_eq!(config.basemap.api_key.as_deref(), Some("abc"));
        assert!(config.basemap.base_url.starts_with("https://vector.hereapi.com"));
        assert_eq!(config.overlays, vec![OverlayConfig::embedded("towers")]);
    }

    #[test]
    fn api_key_fallback() {
        let config = AppConfig::default().with_api_key_from(Some("from-env".into()));
        assert_eq!(config.basemap.api_key.as_deref(), Some("from-env"));

        let config = config.with_api_key_from(Some("other".into()));
        assert_eq!(config.basemap.api_key.as_deref(), Some("from-env"));

        let config = AppConfig::default().with_api_key_from(Some(String::new()));
        assert_eq!(config.basemap.api_key, None);
    }

    #[test]
    fn embedded_overlays() {
        for overlay in AppConfig::default().overlays {
            let text = overlay.read().expect("embedded data");
            assert!(text.contains("FeatureCollection"));
        }

        assert_matches!(
            OverlayConfig::embedded("unknown").read(),
            Err(TowerMapError::DataSource { name, .. }) if name == "unknown"
        );
    }

    #[test]
    fn default_map_options() {
        let options = AppConfig::default().map_options().expect("valid options");
        assert_eq!(options.canvas_id, "mapCanvas");
        assert_eq!(options.max_tilt_deg, 55.0);
        assert_eq!(
            options.theme.extends.as_deref(),
            Some(DEFAULT_BASE_THEME)
        );
    }
}
