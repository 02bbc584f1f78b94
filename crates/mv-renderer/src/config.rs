//! Renderer configuration

use serde::{Deserialize, Serialize};

use crate::constants::orbit;

/// Settings that tune interaction and drawing but are not part of the
/// host-supplied viewport configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    /// Smooth out orbit motion over several frames
    pub enable_damping: bool,
    /// Fraction of the pending rotation applied per frame (0.0-1.0)
    pub damping_factor: f32,
    /// Rotation speed multiplier
    pub rotate_speed: f32,
    /// Dolly speed multiplier
    pub zoom_speed: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enable_damping: false,
            damping_factor: orbit::DAMPING_FACTOR,
            rotate_speed: orbit::ROTATE_SPEED,
            zoom_speed: orbit::ZOOM_SPEED,
        }
    }
}
