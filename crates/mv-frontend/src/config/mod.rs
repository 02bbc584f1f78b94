//! Application configuration module
//!
//! The viewer properties and interaction settings are persisted between
//! runs so the last opened model and its view come back on start.

mod manager;

pub use manager::{ConfigError, ConfigManager, SharedConfig, create_shared_config};

use std::path::PathBuf;

use glam::Vec3;
use mv_core::config::{DEFAULT_CAMERA_SEED, ZOOM_MAX, ZOOM_MIN};
use mv_core::{ModelSource, ViewportConfig};
use mv_renderer::config::RendererConfig;
use serde::{Deserialize, Serialize};

/// Viewer properties as the host edits them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportSettings {
    /// OBJ file to show
    pub model_path: Option<PathBuf>,
    pub allow_horizontal_rotate: bool,
    pub allow_vertical_rotate: bool,
    pub allow_zoom: bool,
    pub zoom: f32,
    /// Camera seed position (x, y, z)
    pub camera: [f32; 3],
    /// Background color string, e.g. `#ffffff`
    pub background: String,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            model_path: None,
            allow_horizontal_rotate: true,
            allow_vertical_rotate: true,
            allow_zoom: true,
            zoom: 1.0,
            camera: DEFAULT_CAMERA_SEED.to_array(),
            background: "#ffffff".to_string(),
        }
    }
}

impl ViewportSettings {
    /// Builds the viewport configuration these settings describe.
    ///
    /// Fails if the background string is not a valid color.
    pub fn to_viewport_config(&self) -> Result<ViewportConfig, mv_core::ConfigError> {
        let mut config = ViewportConfig::new()
            .with_rotation(self.allow_horizontal_rotate, self.allow_vertical_rotate)
            .with_zoom_enabled(self.allow_zoom)
            .with_zoom(self.zoom.clamp(ZOOM_MIN, ZOOM_MAX))
            .with_camera_seed(Vec3::from_array(self.camera))
            .with_background_str(&self.background)?;
        if let Some(path) = &self.model_path {
            config = config.with_model(ModelSource::path(path.clone()));
        }
        Ok(config)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    /// Viewer properties
    #[serde(default)]
    pub viewport: ViewportSettings,
    /// Orbit interaction settings
    #[serde(default)]
    pub renderer: RendererConfig,
}

impl AppConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use mv_core::Color;

    use super::*;

    #[test]
    fn test_default_settings_match_viewport_defaults() {
        let config = ViewportSettings::default().to_viewport_config().unwrap();
        assert_eq!(config, ViewportConfig::default());
    }

    #[test]
    fn test_settings_to_config() {
        let settings = ViewportSettings {
            model_path: Some(PathBuf::from("models/teapot.obj")),
            allow_horizontal_rotate: false,
            zoom: 2.5,
            camera: [1.0, 2.0, 3.0],
            background: "#000".to_string(),
            ..Default::default()
        };
        let config = settings.to_viewport_config().unwrap();
        assert_eq!(config.model, Some(ModelSource::path("models/teapot.obj")));
        assert!(!config.allow_horizontal_rotate);
        assert!(config.allow_vertical_rotate);
        assert_eq!(config.zoom, 2.5);
        assert_eq!(config.camera_seed, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.background, Color::BLACK);
    }

    #[test]
    fn test_bad_background_is_an_error() {
        let settings = ViewportSettings {
            background: "not a color".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            settings.to_viewport_config(),
            Err(mv_core::ConfigError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: AppConfig = ron::from_str("(version: 1, viewport: (zoom: 3.0))").unwrap();
        assert_eq!(config.viewport.zoom, 3.0);
        assert!(config.viewport.allow_zoom);
        assert_eq!(config.viewport.background, "#ffffff");
        assert_eq!(config.renderer, RendererConfig::default());
    }
}
