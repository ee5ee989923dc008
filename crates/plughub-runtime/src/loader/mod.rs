//! Plugin loader — resolves plugins from a [`PluginSource`], validates
//! them structurally, and caches the results by name and location.

pub mod descriptor;
#[cfg(feature = "dynamic")]
pub mod dynamic;
pub mod source;
pub mod static_source;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use plughub_core::error::{AppError, ErrorKind};
use plughub_core::result::AppResult;

use crate::validator;

pub use descriptor::DescriptorPluginSource;
#[cfg(feature = "dynamic")]
pub use dynamic::DynamicPluginSource;
pub use source::{LoadedPlugin, PluginModule, PluginSource};
pub use static_source::StaticPluginSource;

/// Loads plugins through a source and remembers what it loaded.
#[derive(Debug)]
pub struct PluginLoader {
    /// Where plugin modules come from.
    source: Arc<dyn PluginSource>,
    /// Plugin name → loaded plugin.
    by_name: RwLock<HashMap<String, LoadedPlugin>>,
    /// Source location → plugin name.
    by_location: RwLock<HashMap<String, String>>,
}

impl PluginLoader {
    /// Creates a loader over `source`.
    pub fn new(source: Arc<dyn PluginSource>) -> Self {
        Self {
            source,
            by_name: RwLock::new(HashMap::new()),
            by_location: RwLock::new(HashMap::new()),
        }
    }

    /// Loads the plugin at `location`.
    ///
    /// Re-loading a location, or a location yielding an already loaded
    /// plugin name, returns the cached result.
    pub async fn load(&self, location: &str) -> AppResult<LoadedPlugin> {
        if let Some(cached) = self.cached_location(location).await {
            debug!(location = %location, plugin = %cached.plugin.name, "Plugin load served from cache");
            return Ok(cached);
        }

        let module = self.source.resolve(location).await.map_err(|e| {
            if e.kind == ErrorKind::Load || e.kind == ErrorKind::Validation {
                e
            } else {
                AppError::with_source(
                    ErrorKind::Load,
                    format!("Failed to resolve plugin at '{location}'"),
                    e,
                )
            }
        })?;

        let plugin = module
            .into_plugin()
            .ok_or_else(|| AppError::load(format!("Module at '{location}' exports no plugin")))?;

        let check = validator::validate_structure(&plugin);
        if !check.valid {
            warn!(
                location = %location,
                plugin = %plugin.name,
                errors = %check.errors.join("; "),
                "Loaded plugin failed validation"
            );
            check.into_result()?;
        }

        let name = plugin.name.clone();
        let mut by_name = self.by_name.write().await;
        let loaded = by_name
            .entry(name.clone())
            .or_insert_with(|| LoadedPlugin {
                plugin: Arc::new(plugin),
                source_location: location.to_string(),
            })
            .clone();
        drop(by_name);

        self.by_location
            .write()
            .await
            .insert(location.to_string(), name.clone());

        info!(
            plugin = %name,
            version = %loaded.plugin.version,
            location = %loaded.source_location,
            "Plugin loaded"
        );
        Ok(loaded)
    }

    /// Scans `dir` and loads every candidate the source recognises.
    ///
    /// Candidates that fail to load are logged and skipped. A missing
    /// directory yields no plugins.
    pub async fn load_directory(&self, dir: &Path) -> AppResult<Vec<LoadedPlugin>> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %dir.display(), "Plugin directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Load,
                    format!("Failed to read plugin directory '{}'", dir.display()),
                    e,
                ));
            }
        };

        let mut candidates: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if self.source.is_candidate(&path, is_dir) {
                candidates.push(path);
            }
        }
        candidates.sort();

        let mut loaded = Vec::with_capacity(candidates.len());
        for path in candidates {
            let location = path.to_string_lossy().into_owned();
            match self.load(&location).await {
                Ok(plugin) => loaded.push(plugin),
                Err(e) => {
                    warn!(location = %location, error = %e, "Skipping plugin candidate");
                }
            }
        }

        info!(dir = %dir.display(), count = loaded.len(), "Plugin directory scanned");
        Ok(loaded)
    }

    /// Returns a loaded plugin by name.
    pub async fn cached(&self, name: &str) -> Option<LoadedPlugin> {
        self.by_name.read().await.get(name).cloned()
    }

    async fn cached_location(&self, location: &str) -> Option<LoadedPlugin> {
        let name = self.by_location.read().await.get(location).cloned()?;
        self.cached(&name).await
    }

    /// Returns every loaded plugin, sorted by name.
    pub async fn loaded(&self) -> Vec<LoadedPlugin> {
        let by_name = self.by_name.read().await;
        let mut all: Vec<LoadedPlugin> = by_name.values().cloned().collect();
        all.sort_by(|a, b| a.plugin.name.cmp(&b.plugin.name));
        all
    }

    /// Forgets a loaded plugin so the next load resolves it again.
    pub async fn evict(&self, name: &str) -> bool {
        let removed = self.by_name.write().await.remove(name).is_some();
        self.by_location.write().await.retain(|_, n| n != name);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Plugin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_load_caches_by_location_and_name() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let source = StaticPluginSource::new().register("seo", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            PluginModule::named(Plugin::new("seo", "1.0.0"))
        });
        let loader = PluginLoader::new(Arc::new(source));

        let first = loader.load("seo").await.unwrap();
        let again = loader.load("seo").await.unwrap();
        assert!(Arc::ptr_eq(&first.plugin, &again.plugin));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let other_location = loader.load("vendor/seo.plugin").await.unwrap();
        assert!(Arc::ptr_eq(&first.plugin, &other_location.plugin));
        assert_eq!(other_location.source_location, "seo");
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_plugin() {
        let source = StaticPluginSource::new()
            .register("bad", || PluginModule::shaped(Plugin::new("Bad_Name", "1")));
        let loader = PluginLoader::new(Arc::new(source));

        let err = loader.load("bad").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(loader.cached("Bad_Name").await.is_none());
    }

    #[tokio::test]
    async fn test_directory_scan_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("seo.json"),
            r#"{"name": "seo", "version": "1.0.0"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("blog")).unwrap();
        std::fs::write(
            dir.path().join("blog").join("plugin.json"),
            r#"{"plugin": {"name": "blog", "version": "0.3.0", "dependencies": ["seo"]}}"#,
        )
        .unwrap();

        let loader = PluginLoader::new(Arc::new(DescriptorPluginSource::new()));
        let loaded = loader.load_directory(dir.path()).await.unwrap();

        let names: Vec<&str> = loaded.iter().map(|l| l.plugin.name.as_str()).collect();
        assert_eq!(names, vec!["blog", "seo"]);
        assert_eq!(loader.loaded().await.len(), 2);
        assert!(loader.cached("blog").await.unwrap().source_location.ends_with("blog"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let loader = PluginLoader::new(Arc::new(DescriptorPluginSource::new()));
        let loaded = loader
            .load_directory(Path::new("/definitely/not/here"))
            .await
            .unwrap();
        assert!(loaded.is_empty());
    }
}
