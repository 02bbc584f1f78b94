//! Configuration manager for loading, saving, and managing app configuration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::AppConfig;

/// Shared configuration manager type
pub type SharedConfig = Arc<RwLock<ConfigManager>>;

/// Configuration error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Configuration manager handles loading, saving, and accessing app configuration
pub struct ConfigManager {
    config: AppConfig,
    config_path: PathBuf,
    dirty: bool,
}

impl ConfigManager {
    /// Create a new configuration manager, loading from disk if available
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    /// Create a configuration manager backed by `config_path`
    pub fn with_path(config_path: PathBuf) -> Self {
        let config = Self::load_from_path(&config_path).unwrap_or_else(|| {
            tracing::info!("No config file found, using defaults");
            AppConfig::new()
        });

        Self {
            config,
            config_path,
            dirty: false,
        }
    }

    /// Get the OS-standard configuration directory
    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mv-viewer")
    }

    fn default_config_path() -> PathBuf {
        Self::config_dir().join("config.ron")
    }

    fn load_from_path(path: &Path) -> Option<AppConfig> {
        let content = std::fs::read_to_string(path).ok()?;
        match ron::from_str::<AppConfig>(&content) {
            Ok(config) => {
                if config.version > AppConfig::CURRENT_VERSION {
                    tracing::warn!(
                        "Config file version {} is newer than supported version {}",
                        config.version,
                        AppConfig::CURRENT_VERSION
                    );
                }
                tracing::info!("Loaded config from {:?}", path);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file: {}", e);
                None
            }
        }
    }

    /// Get a reference to the current configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a mutable reference to the configuration (marks as dirty)
    pub fn config_mut(&mut self) -> &mut AppConfig {
        self.dirty = true;
        &mut self.config
    }

    /// Viewport configuration from the saved settings, or the defaults if
    /// the saved settings are invalid.
    pub fn viewport_config(&self) -> mv_core::ViewportConfig {
        self.config.viewport.to_viewport_config().unwrap_or_else(|e| {
            tracing::warn!("Ignoring saved viewport settings: {}", e);
            mv_core::ViewportConfig::default()
        })
    }

    /// Check if the configuration has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Save the configuration to disk
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        self.config.version = AppConfig::CURRENT_VERSION;
        let content = ron::ser::to_string_pretty(&self.config, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(&self.config_path, &content).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::info!("Saved config to {:?}", self.config_path);
        self.dirty = false;
        Ok(())
    }

    /// Reset configuration to defaults
    pub fn reset_to_defaults(&mut self) {
        self.config = AppConfig::new();
        self.dirty = true;
    }

    /// Get the config file path (for display purposes)
    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new shared configuration manager
pub fn create_shared_config() -> SharedConfig {
    Arc::new(RwLock::new(ConfigManager::new()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("mv-viewer-test-{}", uuid::Uuid::new_v4()))
            .join("config.ron")
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let manager = ConfigManager::with_path(temp_config_path());
        assert_eq!(manager.config(), &AppConfig::new());
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_config_path();
        let mut manager = ConfigManager::with_path(path.clone());
        manager.config_mut().viewport.zoom = 2.0;
        manager.config_mut().viewport.model_path = Some(PathBuf::from("bunny.obj"));
        manager.config_mut().renderer.enable_damping = true;
        assert!(manager.is_dirty());

        manager.save().unwrap();
        assert!(!manager.is_dirty());

        let reloaded = ConfigManager::with_path(path.clone());
        assert_eq!(reloaded.config(), manager.config());

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_viewport_config_from_settings() {
        let mut manager = ConfigManager::with_path(temp_config_path());
        manager.config_mut().viewport.zoom = 2.0;
        assert_eq!(manager.viewport_config().zoom, 2.0);

        manager.config_mut().viewport.background = "not a color".to_string();
        assert_eq!(manager.viewport_config(), mv_core::ViewportConfig::default());
    }

    #[test]
    fn test_clean_manager_does_not_write() {
        let path = temp_config_path();
        let mut manager = ConfigManager::with_path(path.clone());
        manager.save().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let path = temp_config_path();
        let dir = path.parent().unwrap().to_path_buf();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "this is not ron").unwrap();

        let mut manager = ConfigManager::with_path(path);
        assert_eq!(manager.config(), &AppConfig::new());

        manager.config_mut().viewport.zoom = 4.0;
        manager.reset_to_defaults();
        assert_eq!(manager.config().viewport.zoom, 1.0);
        assert!(manager.is_dirty());

        let _ = std::fs::remove_dir_all(dir);
    }
}
