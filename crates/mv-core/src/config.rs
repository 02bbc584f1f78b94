//! Host-supplied viewport configuration

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorParseError};
use crate::loader::ModelSource;

/// Smallest zoom factor offered by the property controls.
pub const ZOOM_MIN: f32 = 0.1;
/// Largest zoom factor offered by the property controls.
pub const ZOOM_MAX: f32 = 5.0;
/// Slider step of the zoom property control.
pub const ZOOM_STEP: f32 = 0.1;
/// Default camera seed position.
pub const DEFAULT_CAMERA_SEED: Vec3 = Vec3::new(0.0, 1.0, 3.0);

/// Immutable snapshot of everything the host controls.
///
/// A new value replaces the previous scene entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Model to display; `None` renders an empty surface
    pub model: Option<ModelSource>,
    pub allow_horizontal_rotate: bool,
    pub allow_vertical_rotate: bool,
    pub allow_zoom: bool,
    /// Camera zoom factor (> 0)
    pub zoom: f32,
    /// Initial camera position before fitting
    pub camera_seed: Vec3,
    pub background: Color,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            model: None,
            allow_horizontal_rotate: true,
            allow_vertical_rotate: true,
            allow_zoom: true,
            zoom: 1.0,
            camera_seed: DEFAULT_CAMERA_SEED,
            background: Color::WHITE,
        }
    }
}

impl ViewportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: ModelSource) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_rotation(mut self, horizontal: bool, vertical: bool) -> Self {
        self.allow_horizontal_rotate = horizontal;
        self.allow_vertical_rotate = vertical;
        self
    }

    pub fn with_zoom_enabled(mut self, allow_zoom: bool) -> Self {
        self.allow_zoom = allow_zoom;
        self
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_camera_seed(mut self, seed: Vec3) -> Self {
        self.camera_seed = seed;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Sets the background from a host color string.
    pub fn with_background_str(mut self, background: &str) -> Result<Self, ConfigError> {
        self.background = Color::parse(background)?;
        Ok(self)
    }

    /// Checks the numeric fields.
    ///
    /// A missing model is not checked here; see [`Self::require_model`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(ConfigError::InvalidZoom(self.zoom));
        }
        if !self.camera_seed.is_finite() {
            return Err(ConfigError::InvalidCameraSeed);
        }
        Ok(())
    }

    /// Returns the model reference or [`ConfigError::MissingModel`].
    pub fn require_model(&self) -> Result<&ModelSource, ConfigError> {
        self.model.as_ref().ok_or(ConfigError::MissingModel)
    }

    /// Returns true if at least one rotation axis is allowed.
    pub fn rotation_enabled(&self) -> bool {
        self.allow_horizontal_rotate || self.allow_vertical_rotate
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("no model reference supplied")]
    MissingModel,
    #[error("zoom must be a finite value greater than zero, got {0}")]
    InvalidZoom(f32),
    #[error("camera seed position must be finite")]
    InvalidCameraSeed,
    #[error(transparent)]
    InvalidColor(#[from] ColorParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_property_controls() {
        let config = ViewportConfig::default();
        assert!(config.model.is_none());
        assert!(config.allow_horizontal_rotate);
        assert!(config.allow_vertical_rotate);
        assert!(config.allow_zoom);
        assert_eq!(config.zoom, 1.0);
        assert_eq!(config.camera_seed, Vec3::new(0.0, 1.0, 3.0));
        assert_eq!(config.background, Color::WHITE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_zoom_rejected() {
        for zoom in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = ViewportConfig::default().with_zoom(zoom);
            assert!(matches!(config.validate(), Err(ConfigError::InvalidZoom(_))));
        }
    }

    #[test]
    fn test_missing_model() {
        let config = ViewportConfig::default();
        assert_eq!(config.require_model(), Err(ConfigError::MissingModel));

        let config = config.with_model(ModelSource::path("bunny.obj"));
        assert!(config.require_model().is_ok());
    }

    #[test]
    fn test_background_string() {
        let config = ViewportConfig::default()
            .with_background_str("#000000")
            .unwrap();
        assert_eq!(config.background, Color::BLACK);

        let err = ViewportConfig::default().with_background_str("nope");
        assert!(matches!(err, Err(ConfigError::InvalidColor(_))));
    }

    #[test]
    fn test_ron_round_trip_keeps_path_model() {
        let config = ViewportConfig::default()
            .with_model(ModelSource::path("models/teapot.obj"))
            .with_rotation(false, true)
            .with_zoom(2.5);
        let text = ron::to_string(&config).unwrap();
        let parsed: ViewportConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
