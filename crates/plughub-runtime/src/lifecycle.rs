//! Plugin lifecycle callbacks.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use plughub_core::result::AppResult;

use crate::registry::PluginRegistry;

/// Context handed to every lifecycle callback.
#[derive(Clone)]
pub struct LifecycleContext {
    /// Name of the plugin undergoing the transition.
    pub plugin: String,
    /// The plugin's current config, if any.
    pub config: Option<Map<String, Value>>,
    /// The registry. During `install` it already contains the plugin.
    pub registry: Arc<PluginRegistry>,
}

impl fmt::Debug for LifecycleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleContext")
            .field("plugin", &self.plugin)
            .field("config", &self.config)
            .finish()
    }
}

/// Callbacks invoked by the manager on each state transition.
///
/// Every method defaults to a no-op, so a plugin only implements the
/// transitions it cares about.
#[async_trait]
pub trait PluginLifecycle: Send + Sync {
    /// Called after the plugin is registered, before it is persisted.
    /// An error rolls the installation back.
    async fn install(&self, _ctx: &LifecycleContext) -> AppResult<()> {
        Ok(())
    }

    /// Called before the plugin is marked active and its hooks registered.
    async fn activate(&self, _ctx: &LifecycleContext) -> AppResult<()> {
        Ok(())
    }

    /// Called after the plugin's hooks have been removed.
    async fn deactivate(&self, _ctx: &LifecycleContext) -> AppResult<()> {
        Ok(())
    }

    /// Called before the plugin's record is deleted. Errors are logged only.
    async fn uninstall(&self, _ctx: &LifecycleContext) -> AppResult<()> {
        Ok(())
    }
}

/// Lifecycle with no callbacks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLifecycle;

impl PluginLifecycle for NoopLifecycle {}

/// The four lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleStage {
    /// `install`
    Install,
    /// `activate`
    Activate,
    /// `deactivate`
    Deactivate,
    /// `uninstall`
    Uninstall,
}

impl LifecycleStage {
    /// Returns the callback name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
