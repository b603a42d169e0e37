//! Application configuration
//!
//! This module re-exports the shared `AppConfig` from wellness-types and
//! provides platform-specific defaults and persistence for it.

pub use wellness_types::AppConfig;

use super::error::ConfigError;

const APP_NAME: &str = "wellness";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Defaults
// ─────────────────────────────────────────────────────────────────────────────

fn default_workout_directory() -> String {
    dirs::data_dir()
        .map(|p| p.join("wellness").join("workouts"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence
pub trait AppConfigExt: Sized {
    fn load() -> Self;
    fn load_with_defaults() -> Self;
    fn save(&self) -> Result<(), ConfigError>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        match confy::load::<AppConfig>(APP_NAME, CONFIG_NAME) {
            Ok(mut config) => {
                if config.workout_directory.is_empty() {
                    config.workout_directory = default_workout_directory();
                }
                config
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load configuration, using defaults");
                Self::load_with_defaults()
            }
        }
    }

    /// Load with platform-specific defaults (used when no config file exists)
    fn load_with_defaults() -> Self {
        AppConfig::with_workout_directory(default_workout_directory())
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }
}

/// Where `save` writes the config file
pub fn config_path() -> Result<std::path::PathBuf, ConfigError> {
    confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(ConfigError::Load)
}
