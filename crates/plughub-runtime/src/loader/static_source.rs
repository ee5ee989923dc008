//! Plugins compiled into the host binary, registered under location ids.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use plughub_core::error::AppError;
use plughub_core::result::AppResult;

use super::source::{PluginModule, PluginSource};

type ModuleFactory = dyn Fn() -> PluginModule + Send + Sync;

/// Embedded plugin registrations keyed by location id.
///
/// A location resolves by its file stem, so `plugins/seo.plugin` and `seo`
/// both resolve the `seo` registration. During directory scans a marker
/// file `<id>.plugin` enables the embedded plugin `<id>`.
#[derive(Default)]
pub struct StaticPluginSource {
    factories: HashMap<String, Arc<ModuleFactory>>,
}

impl std::fmt::Debug for StaticPluginSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&String> = self.factories.keys().collect();
        ids.sort();
        f.debug_struct("StaticPluginSource").field("ids", &ids).finish()
    }
}

impl StaticPluginSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module factory under `id`.
    pub fn register<F>(mut self, id: &str, factory: F) -> Self
    where
        F: Fn() -> PluginModule + Send + Sync + 'static,
    {
        self.factories.insert(id.to_string(), Arc::new(factory));
        self
    }

    fn key(location: &str) -> &str {
        Path::new(location)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(location)
    }
}

#[async_trait]
impl PluginSource for StaticPluginSource {
    async fn resolve(&self, location: &str) -> AppResult<PluginModule> {
        let key = Self::key(location);
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| AppError::load(format!("No embedded plugin registered as '{key}'")))?;
        Ok(factory())
    }

    fn extension(&self) -> &str {
        "plugin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Plugin;

    #[tokio::test]
    async fn test_resolves_by_stem() {
        let source = StaticPluginSource::new()
            .register("seo", || PluginModule::default_export(Plugin::new("seo", "1.0.0")));

        for location in ["seo", "plugins/seo.plugin"] {
            let module = source.resolve(location).await.unwrap();
            assert_eq!(module.into_plugin().unwrap().name, "seo");
        }
        assert!(source.resolve("blog").await.is_err());
    }
}
