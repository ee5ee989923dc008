//! Plugin source contract.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use plughub_core::result::AppResult;

use crate::plugin::Plugin;

/// A candidate module produced by a source.
///
/// A module may expose its plugin as a default export, a named `plugin`
/// export, or be shaped like a plugin itself. The first present one wins,
/// in that order.
#[derive(Debug, Default)]
pub struct PluginModule {
    /// Default export.
    pub default_export: Option<Plugin>,
    /// Named `plugin` export.
    pub plugin_export: Option<Plugin>,
    /// The module's own shape.
    pub shape: Option<Plugin>,
}

impl PluginModule {
    /// Module whose default export is `plugin`.
    pub fn default_export(plugin: Plugin) -> Self {
        Self {
            default_export: Some(plugin),
            ..Default::default()
        }
    }

    /// Module exporting `plugin` by name.
    pub fn named(plugin: Plugin) -> Self {
        Self {
            plugin_export: Some(plugin),
            ..Default::default()
        }
    }

    /// Module that is itself plugin-shaped.
    pub fn shaped(plugin: Plugin) -> Self {
        Self {
            shape: Some(plugin),
            ..Default::default()
        }
    }

    /// Picks the plugin by export precedence.
    pub fn into_plugin(self) -> Option<Plugin> {
        self.default_export.or(self.plugin_export).or(self.shape)
    }
}

/// A plugin resolved by the loader, with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    /// The validated plugin.
    pub plugin: Arc<Plugin>,
    /// Location the plugin was resolved from.
    pub source_location: String,
}

/// Resolves location identifiers into plugin modules.
#[async_trait]
pub trait PluginSource: Send + Sync + std::fmt::Debug {
    /// Resolves a single location into a module.
    async fn resolve(&self, location: &str) -> AppResult<PluginModule>;

    /// File extension (without the dot) of file candidates during a scan.
    fn extension(&self) -> &str;

    /// Returns whether a directory entry is a candidate module.
    fn is_candidate(&self, path: &Path, is_dir: bool) -> bool {
        is_dir
            || path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_precedence() {
        let module = PluginModule {
            default_export: Some(Plugin::new("from-default", "1.0.0")),
            plugin_export: Some(Plugin::new("from-named", "1.0.0")),
            shape: Some(Plugin::new("from-shape", "1.0.0")),
        };
        assert_eq!(module.into_plugin().unwrap().name, "from-default");

        let module = PluginModule {
            default_export: None,
            plugin_export: Some(Plugin::new("from-named", "1.0.0")),
            shape: Some(Plugin::new("from-shape", "1.0.0")),
        };
        assert_eq!(module.into_plugin().unwrap().name, "from-named");

        assert_eq!(
            PluginModule::shaped(Plugin::new("from-shape", "1.0.0"))
                .into_plugin()
                .unwrap()
                .name,
            "from-shape"
        );
        assert!(PluginModule::default().into_plugin().is_none());
    }
}
