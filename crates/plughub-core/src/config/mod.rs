//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod logging;
pub mod runtime;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::runtime::RuntimeConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Plugin runtime settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Durable plugin record store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `{dir}/default.toml` and `{dir}/{env}.toml`.
    ///
    /// Environment variables prefixed with `PLUGHUB__` override both files.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PLUGHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        tracing::debug!(dir = %dir, env = %env, "Configuration loaded");
        Ok(app_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_files() {
        let config = AppConfig::load_from("does-not-exist", "test").unwrap();
        assert_eq!(config.runtime.plugin_directory, "./plugins");
        assert!(config.runtime.auto_load);
        assert_eq!(config.runtime.callback_timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_load_from_toml_overlay() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        std::fs::write(
            dir.join("default.toml"),
            "[runtime]\nplugin_directory = \"/opt/plugins\"\ncallback_timeout_seconds = 5\n",
        )
        .unwrap();
        std::fs::write(dir.join("staging.toml"), "[logging]\nformat = \"pretty\"\n").unwrap();

        let config = AppConfig::load_from(dir.to_str().unwrap(), "staging").unwrap();
        assert_eq!(config.runtime.plugin_directory, "/opt/plugins");
        assert_eq!(config.runtime.callback_timeout_seconds, 5);
        assert_eq!(config.logging.format, "pretty");
    }
}
