//! Plugin registry — the in-process catalogue of known plugins and their
//! manifests, plus dependency graph queries.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use plughub_core::error::{AppError, ErrorKind};
use plughub_core::result::AppResult;
use plughub_core::traits::PluginRecord;

use crate::capabilities::Capability;
use crate::plugin::Plugin;
use crate::validator;

/// Mutable installation record of a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    /// Plugin name.
    pub name: String,
    /// Installed version.
    pub version: String,
    /// Whether the plugin is active.
    pub enabled: bool,
    /// When the plugin was installed.
    pub installed_at: DateTime<Utc>,
    /// When the manifest last changed.
    pub updated_at: DateTime<Utc>,
    /// Plugin config.
    #[serde(default)]
    pub config: Option<Map<String, Value>>,
}

impl PluginManifest {
    /// Rebuilds a manifest from a durable record.
    ///
    /// Fails if the stored config is not a serialized JSON object.
    pub fn from_record(record: &PluginRecord) -> AppResult<Self> {
        let config = match &record.config {
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Some(map),
                Ok(Value::Null) => None,
                Ok(_) => {
                    return Err(AppError::validation(format!(
                        "Stored config for '{}' must be an object",
                        record.name
                    )));
                }
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::Validation,
                        format!("Stored config for '{}' is not valid JSON", record.name),
                        e,
                    ));
                }
            },
            None => None,
        };

        Ok(Self {
            name: record.name.clone(),
            version: record.version.clone(),
            enabled: record.enabled,
            installed_at: record.installed_at,
            updated_at: record.updated_at,
            config,
        })
    }
}

/// Partial manifest update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestUpdate {
    /// New version.
    pub version: Option<String>,
    /// New enabled flag.
    pub enabled: Option<bool>,
    /// New config.
    pub config: Option<Map<String, Value>>,
}

impl ManifestUpdate {
    /// Update touching only the enabled flag.
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Default::default()
        }
    }
}

/// Derived state of a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Not present in the registry.
    Uninstalled,
    /// Registered, not enabled.
    Installed,
    /// Registered and enabled.
    Active,
    /// The queried name is unknown to the registry.
    Error,
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninstalled => "uninstalled",
            Self::Installed => "installed",
            Self::Active => "active",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Result of a dependency check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyCheck {
    /// Whether every dependency is registered.
    pub satisfied: bool,
    /// Dependencies that are not registered.
    pub missing: Vec<String>,
}

/// Registry of all known plugins.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    /// Plugin name → plugin definition.
    plugins: RwLock<HashMap<String, Arc<Plugin>>>,
    /// Plugin name → manifest.
    manifests: RwLock<HashMap<String, PluginManifest>>,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin after validating it against the current catalogue.
    pub async fn register(&self, plugin: Arc<Plugin>) -> AppResult<()> {
        let mut plugins = self.plugins.write().await;

        if plugins.contains_key(&plugin.name) {
            warn!(plugin = %plugin.name, "Plugin is already registered");
            return Err(AppError::already_installed(&plugin.name));
        }

        validator::validate_or_throw(&plugin, &plugins)?;

        info!(plugin = %plugin.name, version = %plugin.version, "Registering plugin");
        plugins.insert(plugin.name.clone(), plugin);
        Ok(())
    }

    /// Removes a plugin and its manifest. Returns whether anything was removed.
    pub async fn unregister(&self, name: &str) -> bool {
        let mut plugins = self.plugins.write().await;
        let mut manifests = self.manifests.write().await;

        let removed_plugin = plugins.remove(name).is_some();
        let removed_manifest = manifests.remove(name).is_some();

        if removed_plugin || removed_manifest {
            info!(plugin = %name, "Plugin unregistered");
        }
        removed_plugin || removed_manifest
    }

    /// Gets a plugin by name.
    pub async fn get(&self, name: &str) -> Option<Arc<Plugin>> {
        let plugins = self.plugins.read().await;
        plugins.get(name).cloned()
    }

    /// Checks whether a plugin is registered.
    pub async fn contains(&self, name: &str) -> bool {
        let plugins = self.plugins.read().await;
        plugins.contains_key(name)
    }

    /// Returns plugin count.
    pub async fn count(&self) -> usize {
        let plugins = self.plugins.read().await;
        plugins.len()
    }

    /// Returns all registered plugins, sorted by name.
    pub async fn all(&self) -> Vec<Arc<Plugin>> {
        let plugins = self.plugins.read().await;
        let mut all: Vec<Arc<Plugin>> = plugins.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Returns all plugins whose manifest is enabled, sorted by name.
    pub async fn active(&self) -> Vec<Arc<Plugin>> {
        let plugins = self.plugins.read().await;
        let manifests = self.manifests.read().await;
        let mut active: Vec<Arc<Plugin>> = plugins
            .values()
            .filter(|p| manifests.get(&p.name).is_some_and(|m| m.enabled))
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        active
    }

    /// Returns all plugins declaring a non-empty list for `capability`.
    pub async fn by_capability(&self, capability: Capability) -> Vec<Arc<Plugin>> {
        let mut matching: Vec<Arc<Plugin>> = self
            .plugins
            .read()
            .await
            .values()
            .filter(|p| p.has_capability(capability))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        matching
    }

    /// Gets a plugin's manifest.
    pub async fn manifest(&self, name: &str) -> Option<PluginManifest> {
        let manifests = self.manifests.read().await;
        manifests.get(name).cloned()
    }

    /// Replaces a plugin's manifest wholesale.
    pub async fn set_manifest(&self, manifest: PluginManifest) {
        let mut manifests = self.manifests.write().await;
        manifests.insert(manifest.name.clone(), manifest);
    }

    /// Merges `update` into the plugin's manifest, creating a default one
    /// (enabled, stamped now) if none exists. Always refreshes `updated_at`.
    pub async fn update_manifest(&self, name: &str, update: ManifestUpdate) -> AppResult<PluginManifest> {
        let plugins = self.plugins.read().await;
        let plugin = plugins
            .get(name)
            .ok_or_else(|| AppError::not_found(format!("Plugin '{name}' not found")))?;

        let mut manifests = self.manifests.write().await;
        let now = Utc::now();
        let manifest = manifests.entry(name.to_string()).or_insert_with(|| PluginManifest {
            name: name.to_string(),
            version: plugin.version.clone(),
            enabled: true,
            installed_at: now,
            updated_at: now,
            config: None,
        });

        if let Some(version) = update.version {
            manifest.version = version;
        }
        if let Some(enabled) = update.enabled {
            manifest.enabled = enabled;
        }
        if let Some(config) = update.config {
            manifest.config = Some(config);
        }
        manifest.updated_at = now.max(manifest.updated_at);

        debug!(plugin = %name, enabled = manifest.enabled, "Manifest updated");
        Ok(manifest.clone())
    }

    /// Returns every manifest, sorted by name.
    pub async fn manifests(&self) -> Vec<PluginManifest> {
        let manifests = self.manifests.read().await;
        let mut all: Vec<PluginManifest> = manifests.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Checks that every dependency of `name` is registered (not
    /// necessarily active).
    pub async fn check_dependencies(&self, name: &str) -> AppResult<DependencyCheck> {
        let plugin = self
            .get(name)
            .await
            .ok_or_else(|| AppError::not_found(format!("Plugin '{name}' not found")))?;
        Ok(self.check_plugin_dependencies(&plugin).await)
    }

    /// Same as [`check_dependencies`](Self::check_dependencies) for a
    /// plugin that is not registered yet.
    pub async fn check_plugin_dependencies(&self, plugin: &Plugin) -> DependencyCheck {
        let plugins = self.plugins.read().await;
        let missing: Vec<String> = plugin
            .dependencies
            .iter()
            .filter(|dep| !plugins.contains_key(dep.as_str()))
            .cloned()
            .collect();

        DependencyCheck {
            satisfied: missing.is_empty(),
            missing,
        }
    }

    /// Returns every registered plugin that lists `name` as a dependency.
    pub async fn dependents(&self, name: &str) -> Vec<String> {
        let plugins = self.plugins.read().await;
        let mut dependents: Vec<String> = plugins
            .values()
            .filter(|p| p.depends_on_plugin(name))
            .map(|p| p.name.clone())
            .collect();
        dependents.sort();
        dependents
    }

    /// Returns the derived state of a plugin, or [`PluginState::Error`] if
    /// the name is unknown.
    pub async fn plugin_state(&self, name: &str) -> PluginState {
        let plugins = self.plugins.read().await;
        if !plugins.contains_key(name) {
            return PluginState::Error;
        }
        let manifests = self.manifests.read().await;
        match manifests.get(name) {
            Some(m) if m.enabled => PluginState::Active,
            _ => PluginState::Installed,
        }
    }

    /// Returns whether the plugin's manifest is enabled.
    pub async fn is_active(&self, name: &str) -> bool {
        self.plugin_state(name).await == PluginState::Active
    }
}

/// Orders plugins so every plugin comes after the dependencies it shares
/// the set with. Ties are broken by name. Plugins caught in a cycle are
/// appended last in name order so validation can reject them.
pub fn dependency_order(plugins: Vec<Arc<Plugin>>) -> Vec<Arc<Plugin>> {
    let by_name: BTreeMap<String, Arc<Plugin>> = plugins
        .into_iter()
        .map(|p| (p.name.clone(), p))
        .collect();

    let mut pending: BTreeMap<&str, usize> = by_name
        .values()
        .map(|p| {
            let in_set = p
                .dependencies
                .iter()
                .filter(|d| by_name.contains_key(d.as_str()))
                .collect::<BTreeSet<_>>()
                .len();
            (p.name.as_str(), in_set)
        })
        .collect();

    let mut ready: BTreeSet<&str> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut ordered = Vec::with_capacity(by_name.len());

    while let Some(name) = ready.pop_first() {
        pending.remove(name);
        ordered.push(by_name[name].clone());

        for (dependent, count) in pending.iter_mut() {
            let plugin = &by_name[*dependent];
            if plugin.depends_on_plugin(name) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    ordered.extend(pending.keys().map(|name| by_name[*name].clone()));
    ordered
}
