//! Shared-library plugin source using `libloading` (feature `dynamic`).

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use plughub_core::error::{AppError, ErrorKind};
use plughub_core::result::AppResult;

use crate::plugin::Plugin;

use super::source::{PluginModule, PluginSource};

/// Type of the entry points exported by dynamic plugins.
///
/// Dynamic plugins must be built with the same compiler and `plughub-runtime`
/// version as the host and export
/// `extern "C" fn plughub_default_plugin() -> *mut Plugin` (preferred) or
/// `extern "C" fn plughub_plugin() -> *mut Plugin`, returning `Box::into_raw`.
pub type PluginEntryFn = unsafe extern "C" fn() -> *mut Plugin;

/// Entry symbols in export precedence order.
const ENTRY_SYMBOLS: [&[u8]; 2] = [b"plughub_default_plugin", b"plughub_plugin"];

/// Loads plugins from shared libraries (.so / .dll / .dylib).
pub struct DynamicPluginSource {
    /// Loaded libraries (kept alive for the lifetime of the source).
    libraries: Mutex<Vec<libloading::Library>>,
}

impl DynamicPluginSource {
    /// Creates a new dynamic source.
    pub fn new() -> Self {
        Self {
            libraries: Mutex::new(Vec::new()),
        }
    }

    /// Loads a plugin module from the given shared library path.
    ///
    /// # Safety
    /// This function loads arbitrary code from a shared library.
    /// Only load trusted plugins.
    unsafe fn load_from_path(&self, path: &Path) -> AppResult<PluginModule> {
        let lib = unsafe { libloading::Library::new(path) }.map_err(|e| {
            AppError::with_source(
                ErrorKind::Load,
                format!("Failed to load plugin library '{}'", path.display()),
                e,
            )
        })?;

        let mut module = PluginModule::default();
        for (index, symbol) in ENTRY_SYMBOLS.iter().enumerate() {
            let Ok(entry) = (unsafe { lib.get::<PluginEntryFn>(symbol) }) else {
                continue;
            };
            let raw = unsafe { entry() };
            if raw.is_null() {
                continue;
            }
            let plugin = *unsafe { Box::from_raw(raw) };
            if index == 0 {
                module.default_export = Some(plugin);
            } else {
                module.plugin_export = Some(plugin);
            }
            break;
        }

        if module.default_export.is_none() && module.plugin_export.is_none() {
            return Err(AppError::load(format!(
                "Plugin library '{}' exports no plugin entry point",
                path.display()
            )));
        }

        info!(path = %path.display(), "Dynamic plugin library loaded");

        self.libraries
            .lock()
            .map_err(|_| AppError::internal("Dynamic library list poisoned"))?
            .push(lib);

        Ok(module)
    }
}

impl Default for DynamicPluginSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DynamicPluginSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loaded = self.libraries.lock().map(|l| l.len()).unwrap_or(0);
        f.debug_struct("DynamicPluginSource")
            .field("loaded_count", &loaded)
            .finish()
    }
}

#[async_trait]
impl PluginSource for DynamicPluginSource {
    async fn resolve(&self, location: &str) -> AppResult<PluginModule> {
        // SAFETY: the operator controls the plugin directory; only trusted
        // libraries built against this runtime are expected there.
        unsafe { self.load_from_path(Path::new(location)) }
    }

    fn extension(&self) -> &str {
        std::env::consts::DLL_EXTENSION
    }

    fn is_candidate(&self, path: &Path, _is_dir: bool) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension())
    }
}
