//! Hook context, typed hook names, and the lifecycle notification hooks.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::plugin::Plugin;

/// Context passed to every handler alongside the threaded value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookContext {
    /// The hook being executed.
    pub hook: String,
    /// Plugin owning the handler being invoked.
    pub plugin_name: String,
    /// When the handler was invoked.
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied context overrides.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl HookContext {
    /// Creates a context for one handler invocation.
    ///
    /// A string `plugin_name` or an RFC 3339 `timestamp` in `extra` replaces
    /// the built-in value and is taken out of `extra`.
    pub fn new(hook: &str, plugin_name: &str, mut extra: Map<String, Value>) -> Self {
        let plugin_name = match extra.remove("plugin_name") {
            Some(Value::String(name)) => name,
            _ => plugin_name.to_string(),
        };
        let timestamp = extra
            .remove("timestamp")
            .and_then(|v| v.as_str().and_then(|t| DateTime::parse_from_rfc3339(t).ok()))
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Self {
            hook: hook.to_string(),
            plugin_name,
            timestamp,
            extra,
        }
    }

    /// Gets a caller-supplied value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Gets a caller-supplied string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

/// A hook name bound to the payload type threaded through its handlers.
pub struct TypedHook<T> {
    name: &'static str,
    _payload: PhantomData<fn() -> T>,
}

impl<T> TypedHook<T> {
    /// Binds `name` to payload type `T`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    /// Returns the hook name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for TypedHook<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedHook<T> {}

impl<T> fmt::Debug for TypedHook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedHook").field(&self.name).finish()
    }
}

/// Payload of the lifecycle notification hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEvent {
    /// Plugin that changed state.
    pub plugin: String,
    /// Its version.
    pub version: String,
    /// When the transition completed.
    pub timestamp: DateTime<Utc>,
}

impl PluginEvent {
    /// Creates an event for `plugin` stamped now.
    pub fn for_plugin(plugin: &Plugin) -> Self {
        Self {
            plugin: plugin.name.clone(),
            version: plugin.version.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Fired after a plugin is installed.
pub const PLUGIN_INSTALL: TypedHook<PluginEvent> = TypedHook::new("plugin:install");
/// Fired after a plugin is uninstalled.
pub const PLUGIN_UNINSTALL: TypedHook<PluginEvent> = TypedHook::new("plugin:uninstall");
/// Fired after a plugin is activated.
pub const PLUGIN_ACTIVATE: TypedHook<PluginEvent> = TypedHook::new("plugin:activate");
/// Fired after a plugin is deactivated.
pub const PLUGIN_DEACTIVATE: TypedHook<PluginEvent> = TypedHook::new("plugin:deactivate");

/// The lifecycle notification hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleHook {
    /// `plugin:install`
    Install,
    /// `plugin:uninstall`
    Uninstall,
    /// `plugin:activate`
    Activate,
    /// `plugin:deactivate`
    Deactivate,
}

impl LifecycleHook {
    /// Returns the typed hook for this notification.
    pub fn typed(&self) -> TypedHook<PluginEvent> {
        match self {
            Self::Install => PLUGIN_INSTALL,
            Self::Uninstall => PLUGIN_UNINSTALL,
            Self::Activate => PLUGIN_ACTIVATE,
            Self::Deactivate => PLUGIN_DEACTIVATE,
        }
    }

    /// Returns the hook name.
    pub fn as_str(&self) -> &'static str {
        self.typed().name()
    }
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
