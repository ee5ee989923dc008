//! Plugin runtime configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Plugin runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Directory scanned for plugin candidates.
    #[serde(default = "default_plugin_directory")]
    pub plugin_directory: String,
    /// Whether to scan the plugin directory on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
    /// Upper bound for a single lifecycle callback, in seconds.
    #[serde(default = "default_timeout")]
    pub callback_timeout_seconds: u64,
    /// Upper bound for a single hook handler invocation, in seconds.
    #[serde(default = "default_timeout")]
    pub hook_handler_timeout_seconds: u64,
}

impl RuntimeConfig {
    /// Lifecycle callback timeout as a `Duration`.
    pub fn callback_timeout(&self) -> Duration {
        Duration::from_secs(self.callback_timeout_seconds)
    }

    /// Hook handler timeout as a `Duration`.
    pub fn hook_handler_timeout(&self) -> Duration {
        Duration::from_secs(self.hook_handler_timeout_seconds)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            plugin_directory: default_plugin_directory(),
            auto_load: true,
            callback_timeout_seconds: default_timeout(),
            hook_handler_timeout_seconds: default_timeout(),
        }
    }
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}
