//! Plugin manager — drives the install / activate / deactivate / uninstall
//! state machine and keeps the registry, the hook system and the durable
//! store consistent.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use plughub_core::config::RuntimeConfig;
use plughub_core::error::{AppError, ErrorKind};
use plughub_core::result::AppResult;
use plughub_core::traits::{PluginRecord, PluginRecordUpdate, PluginStore};

use crate::capabilities::{AdminPageDefinition, RouteDefinition};
use crate::hooks::definitions::{LifecycleHook, PluginEvent};
use crate::hooks::dispatcher::HookDispatcher;
use crate::hooks::registry::HookRegistry;
use crate::lifecycle::{LifecycleContext, LifecycleStage};
use crate::loader::PluginLoader;
use crate::plugin::Plugin;
use crate::registry::{dependency_order, ManifestUpdate, PluginManifest, PluginRegistry, PluginState};
use crate::store::MemoryPluginStore;
use crate::validator;

/// A lifecycle notification waiting to be fired once the transition lock
/// is released.
type PendingEvent = (LifecycleHook, PluginEvent);

/// Snapshot of one installed plugin.
#[derive(Debug, Clone, Serialize)]
pub struct PluginStatus {
    /// Plugin name.
    pub name: String,
    /// Plugin version.
    pub version: String,
    /// Derived state.
    pub state: PluginState,
    /// Declared dependencies.
    pub dependencies: Vec<String>,
    /// Installation time, if a manifest exists.
    pub installed_at: Option<DateTime<Utc>>,
    /// Last manifest change, if a manifest exists.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A route contributed by an active plugin.
#[derive(Debug, Clone, Serialize)]
pub struct PluginRoute {
    /// Owning plugin.
    pub plugin: String,
    /// The route.
    pub route: RouteDefinition,
}

/// An admin page contributed by an active plugin.
#[derive(Debug, Clone, Serialize)]
pub struct PluginAdminPage {
    /// Owning plugin.
    pub plugin: String,
    /// The page.
    pub page: AdminPageDefinition,
}

/// Outcome of [`PluginManager::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Plugins registered again from their durable record.
    pub restored: Vec<String>,
    /// Restored plugins that were re-activated.
    pub activated: Vec<String>,
    /// Records whose plugin the loader does not know.
    pub orphaned: Vec<String>,
    /// Records that failed manifest validation.
    pub invalid: Vec<String>,
    /// Plugins that could not be registered or re-activated.
    pub failed: Vec<String>,
}

/// Orchestrates plugin state transitions.
///
/// Transitions are serialized by a single lock. Lifecycle notifications
/// (`plugin:install`, ...) fire after the lock is released, so their
/// handlers may call back into the manager.
#[derive(Debug)]
pub struct PluginManager {
    /// Plugin registry.
    plugin_registry: Arc<PluginRegistry>,
    /// Hook registry.
    hook_registry: Arc<HookRegistry>,
    /// Hook dispatcher.
    hook_dispatcher: Arc<HookDispatcher>,
    /// Durable record store.
    store: Arc<dyn PluginStore>,
    /// Upper bound for each lifecycle callback.
    callback_timeout: Duration,
    /// Serializes transitions.
    transitions: Mutex<()>,
}

impl PluginManager {
    /// Creates a manager over `store` with timeouts from `config`.
    pub fn new(store: Arc<dyn PluginStore>, config: &RuntimeConfig) -> Self {
        Self::with_components(
            Arc::new(PluginRegistry::new()),
            Arc::new(HookRegistry::new()),
            store,
            config.callback_timeout(),
            config.hook_handler_timeout(),
        )
    }

    /// Creates a manager backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPluginStore::new()), &RuntimeConfig::default())
    }

    /// Creates a manager from explicit parts.
    pub fn with_components(
        plugin_registry: Arc<PluginRegistry>,
        hook_registry: Arc<HookRegistry>,
        store: Arc<dyn PluginStore>,
        callback_timeout: Duration,
        handler_timeout: Duration,
    ) -> Self {
        let hook_dispatcher = Arc::new(HookDispatcher::with_timeout(
            hook_registry.clone(),
            handler_timeout,
        ));

        Self {
            plugin_registry,
            hook_registry,
            hook_dispatcher,
            store,
            callback_timeout,
            transitions: Mutex::new(()),
        }
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Installs a plugin, optionally with an initial config.
    ///
    /// All-or-nothing: if the install callback or the durable insert fails,
    /// the plugin is removed from the registry again.
    pub async fn install(
        &self,
        plugin: impl Into<Arc<Plugin>>,
        config: Option<Map<String, Value>>,
    ) -> AppResult<()> {
        let plugin = plugin.into();
        let event = {
            let _guard = self.transitions.lock().await;
            self.install_locked(plugin, config).await?
        };
        self.emit(vec![event]).await;
        Ok(())
    }

    /// Uninstalls a plugin, deactivating it first if needed.
    pub async fn uninstall(&self, name: &str) -> AppResult<()> {
        let mut events = Vec::new();
        let result = {
            let _guard = self.transitions.lock().await;
            self.uninstall_locked(name, &mut events).await
        };
        self.emit(events).await;
        result
    }

    /// Activates a plugin, activating inactive dependencies first.
    pub async fn activate(&self, name: &str) -> AppResult<()> {
        let mut events = Vec::new();
        let result = {
            let _guard = self.transitions.lock().await;
            self.activate_locked(name, &mut events).await
        };
        self.emit(events).await;
        result
    }

    /// Deactivates a plugin. Fails while an active plugin depends on it.
    pub async fn deactivate(&self, name: &str) -> AppResult<()> {
        let mut events = Vec::new();
        let result = {
            let _guard = self.transitions.lock().await;
            self.deactivate_locked(name, &mut events).await
        };
        self.emit(events).await;
        result
    }

    /// Deactivates every active plugin, dependents first. Failures are
    /// logged and skipped. Returns the names that were deactivated.
    pub async fn deactivate_all(&self) -> Vec<String> {
        let mut events = Vec::new();
        let mut deactivated = Vec::new();
        {
            let _guard = self.transitions.lock().await;
            let active = dependency_order(self.plugin_registry.active().await);

            for plugin in active.iter().rev() {
                match self.deactivate_locked(&plugin.name, &mut events).await {
                    Ok(()) => deactivated.push(plugin.name.clone()),
                    Err(e) => {
                        error!(plugin = %plugin.name, error = %e, "Error deactivating plugin");
                    }
                }
            }
        }
        self.emit(events).await;

        info!(count = deactivated.len(), "All plugins deactivated");
        deactivated
    }

    /// Merges `config` into the plugin's config after validating the result
    /// against its declared schema, then persists it.
    pub async fn update_config(
        &self,
        name: &str,
        config: Map<String, Value>,
    ) -> AppResult<PluginManifest> {
        let _guard = self.transitions.lock().await;

        let plugin = self.require(name).await?;
        let mut merged = self
            .plugin_registry
            .manifest(name)
            .await
            .and_then(|m| m.config)
            .unwrap_or_default();
        merged.extend(config);

        Self::check_config(&plugin, &merged)?;
        let serialized = serde_json::to_string(&merged)?;

        self.store
            .update(
                name,
                &PluginRecordUpdate {
                    config: Some(serialized),
                    ..Default::default()
                },
            )
            .await?;

        let manifest = self
            .plugin_registry
            .update_manifest(
                name,
                ManifestUpdate {
                    config: Some(merged),
                    ..Default::default()
                },
            )
            .await?;

        info!(plugin = %name, "Plugin config updated");
        Ok(manifest)
    }

    /// Rebuilds registry state from the durable store.
    ///
    /// Every record is validated as a manifest. Records whose plugin the
    /// loader has loaded are registered in dependency order without running
    /// `install`; records marked enabled are activated again. Records for
    /// unknown plugins are reported and left untouched.
    pub async fn reconcile(&self, loader: &PluginLoader) -> AppResult<ReconcileReport> {
        let mut events = Vec::new();
        let report = {
            let _guard = self.transitions.lock().await;
            self.reconcile_locked(loader, &mut events).await?
        };
        self.emit(events).await;

        info!(
            restored = report.restored.len(),
            activated = report.activated.len(),
            orphaned = report.orphaned.len(),
            invalid = report.invalid.len(),
            failed = report.failed.len(),
            "Plugin state reconciled"
        );
        Ok(report)
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Returns the state of a plugin. Unknown names are `Uninstalled`.
    pub async fn plugin_state(&self, name: &str) -> PluginState {
        match self.plugin_registry.plugin_state(name).await {
            PluginState::Error => PluginState::Uninstalled,
            state => state,
        }
    }

    /// Returns whether the plugin is active.
    pub async fn is_active(&self, name: &str) -> bool {
        self.plugin_registry.is_active(name).await
    }

    /// Returns whether the plugin is installed (active or not).
    pub async fn is_installed(&self, name: &str) -> bool {
        self.plugin_registry.contains(name).await
    }

    /// Lists every installed plugin, sorted by name.
    pub async fn list(&self) -> Vec<PluginStatus> {
        let mut statuses = Vec::new();
        for plugin in self.plugin_registry.all().await {
            let manifest = self.plugin_registry.manifest(&plugin.name).await;
            statuses.push(PluginStatus {
                name: plugin.name.clone(),
                version: plugin.version.clone(),
                state: self.plugin_state(&plugin.name).await,
                dependencies: plugin.dependencies.clone(),
                installed_at: manifest.as_ref().map(|m| m.installed_at),
                updated_at: manifest.as_ref().map(|m| m.updated_at),
            });
        }
        statuses
    }

    /// Routes of every active plugin.
    pub async fn active_routes(&self) -> Vec<PluginRoute> {
        self.plugin_registry
            .active()
            .await
            .iter()
            .flat_map(|p| {
                p.routes.iter().map(|route| PluginRoute {
                    plugin: p.name.clone(),
                    route: route.clone(),
                })
            })
            .collect()
    }

    /// Admin pages of every active plugin, ordered by `order` then title.
    /// Pages without an order come last.
    pub async fn active_admin_pages(&self) -> Vec<PluginAdminPage> {
        let mut pages: Vec<PluginAdminPage> = self
            .plugin_registry
            .active()
            .await
            .iter()
            .flat_map(|p| {
                p.admin_pages.iter().map(|page| PluginAdminPage {
                    plugin: p.name.clone(),
                    page: page.clone(),
                })
            })
            .collect();

        pages.sort_by(|a, b| {
            let ka = a.page.order.unwrap_or(i32::MAX);
            let kb = b.page.order.unwrap_or(i32::MAX);
            ka.cmp(&kb).then_with(|| a.page.title.cmp(&b.page.title))
        });
        pages
    }

    /// Returns the hook dispatcher for firing hooks.
    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.hook_dispatcher
    }

    /// Returns the hook registry.
    pub fn hook_registry(&self) -> &Arc<HookRegistry> {
        &self.hook_registry
    }

    /// Returns the plugin registry.
    pub fn plugin_registry(&self) -> &Arc<PluginRegistry> {
        &self.plugin_registry
    }

    /// Returns the durable store.
    pub fn store(&self) -> &Arc<dyn PluginStore> {
        &self.store
    }

    // ── Transition bodies (lock held) ────────────────────────────

    async fn install_locked(
        &self,
        plugin: Arc<Plugin>,
        config: Option<Map<String, Value>>,
    ) -> AppResult<PendingEvent> {
        let name = plugin.name.clone();

        if self.plugin_registry.contains(&name).await {
            warn!(plugin = %name, "Install rejected: already installed");
            return Err(AppError::already_installed(&name));
        }

        if let Some(config) = &config {
            Self::check_config(&plugin, config)?;
        }
        let serialized = config.as_ref().map(serde_json::to_string).transpose()?;

        let deps = self.plugin_registry.check_plugin_dependencies(&plugin).await;
        if !deps.satisfied {
            warn!(plugin = %name, missing = ?deps.missing, "Install rejected: missing dependencies");
            return Err(AppError::dependency(
                format!(
                    "Plugin '{name}' has missing dependencies: {}",
                    deps.missing.join(", ")
                ),
                deps.missing,
            ));
        }

        self.plugin_registry.register(plugin.clone()).await?;

        let ctx = self.context(&name, config.clone());
        if let Err(e) = self.run_callback(&plugin, LifecycleStage::Install, &ctx).await {
            self.plugin_registry.unregister(&name).await;
            warn!(plugin = %name, "Installation rolled back");
            return Err(e);
        }

        let record = PluginRecord::new(&name, &plugin.version).with_config(serialized);
        if let Err(e) = self.store.insert(&record).await {
            error!(plugin = %name, error = %e, "Failed to persist plugin record");
            self.run_callback_best_effort(&plugin, LifecycleStage::Uninstall, &ctx)
                .await;
            self.plugin_registry.unregister(&name).await;
            warn!(plugin = %name, "Installation rolled back");
            return Err(e);
        }

        self.plugin_registry
            .set_manifest(PluginManifest {
                name: name.clone(),
                version: plugin.version.clone(),
                enabled: false,
                installed_at: record.installed_at,
                updated_at: record.updated_at,
                config,
            })
            .await;

        info!(plugin = %name, version = %plugin.version, "Plugin installed");
        Ok((LifecycleHook::Install, PluginEvent::for_plugin(&plugin)))
    }

    async fn uninstall_locked(&self, name: &str, events: &mut Vec<PendingEvent>) -> AppResult<()> {
        let plugin = self.require(name).await?;

        let dependents = self.plugin_registry.dependents(name).await;
        if !dependents.is_empty() {
            warn!(plugin = %name, dependents = ?dependents, "Uninstall blocked by dependents");
            return Err(AppError::dependency(
                format!(
                    "Cannot uninstall '{name}': required by {}",
                    dependents.join(", ")
                ),
                dependents,
            ));
        }

        if self.plugin_registry.is_active(name).await {
            self.deactivate_locked(name, events).await?;
        }

        let ctx = self.context(name, self.current_config(name).await);
        if self
            .run_callback(&plugin, LifecycleStage::Uninstall, &ctx)
            .await
            .is_err()
        {
            warn!(plugin = %name, "Proceeding with uninstall despite callback failure");
        }

        match self.store.delete(name).await {
            Ok(true) => {}
            Ok(false) => warn!(plugin = %name, "No durable record to delete"),
            Err(e) => {
                error!(plugin = %name, error = %e, "Failed to delete plugin record");
                return Err(e);
            }
        }

        let removed_hooks = self.hook_registry.unregister_plugin(name).await;
        self.plugin_registry.unregister(name).await;

        info!(plugin = %name, removed_hooks = removed_hooks, "Plugin uninstalled");
        events.push((LifecycleHook::Uninstall, PluginEvent::for_plugin(&plugin)));
        Ok(())
    }

    fn activate_locked<'a>(
        &'a self,
        name: &'a str,
        events: &'a mut Vec<PendingEvent>,
    ) -> BoxFuture<'a, AppResult<()>> {
        Box::pin(async move {
            let plugin = self.require(name).await?;

            if self.plugin_registry.is_active(name).await {
                warn!(plugin = %name, "Plugin is already active");
                return Ok(());
            }

            for dep in &plugin.dependencies {
                if self.plugin_registry.is_active(dep).await {
                    continue;
                }
                debug!(plugin = %name, dependency = %dep, "Activating dependency first");
                self.activate_locked(dep, &mut *events).await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Dependency,
                        format!("Failed to activate dependency '{dep}' of '{name}'"),
                        e,
                    )
                    .with_violations(vec![dep.clone()])
                })?;
            }

            let ctx = self.context(name, self.current_config(name).await);
            self.run_callback(&plugin, LifecycleStage::Activate, &ctx)
                .await?;

            if let Err(e) = self
                .store
                .update(name, &PluginRecordUpdate::enabled(true))
                .await
            {
                error!(plugin = %name, error = %e, "Failed to persist activation");
                self.run_callback_best_effort(&plugin, LifecycleStage::Deactivate, &ctx)
                    .await;
                return Err(e);
            }

            self.plugin_registry
                .update_manifest(name, ManifestUpdate::enabled(true))
                .await?;
            self.register_hooks(&plugin).await;

            info!(plugin = %name, hooks = plugin.hooks.len(), "Plugin activated");
            events.push((LifecycleHook::Activate, PluginEvent::for_plugin(&plugin)));
            Ok(())
        })
    }

    async fn deactivate_locked(&self, name: &str, events: &mut Vec<PendingEvent>) -> AppResult<()> {
        let plugin = self.require(name).await?;

        if !self.plugin_registry.is_active(name).await {
            warn!(plugin = %name, "Plugin is not active");
            return Ok(());
        }

        let mut active_dependents = Vec::new();
        for dependent in self.plugin_registry.dependents(name).await {
            if self.plugin_registry.is_active(&dependent).await {
                active_dependents.push(dependent);
            }
        }
        if !active_dependents.is_empty() {
            warn!(plugin = %name, dependents = ?active_dependents, "Deactivation blocked by active dependents");
            return Err(AppError::dependency(
                format!(
                    "Cannot deactivate '{name}': active dependents {}",
                    active_dependents.join(", ")
                ),
                active_dependents,
            ));
        }

        let detached = self.hook_registry.detach_plugin(name).await;

        let ctx = self.context(name, self.current_config(name).await);
        if let Err(e) = self
            .run_callback(&plugin, LifecycleStage::Deactivate, &ctx)
            .await
        {
            self.hook_registry.restore(detached).await;
            return Err(e);
        }

        if let Err(e) = self
            .store
            .update(name, &PluginRecordUpdate::enabled(false))
            .await
        {
            error!(plugin = %name, error = %e, "Failed to persist deactivation");
            self.run_callback_best_effort(&plugin, LifecycleStage::Activate, &ctx)
                .await;
            self.hook_registry.restore(detached).await;
            return Err(e);
        }

        self.plugin_registry
            .update_manifest(name, ManifestUpdate::enabled(false))
            .await?;

        info!(plugin = %name, "Plugin deactivated");
        events.push((LifecycleHook::Deactivate, PluginEvent::for_plugin(&plugin)));
        Ok(())
    }

    async fn reconcile_locked(
        &self,
        loader: &PluginLoader,
        events: &mut Vec<PendingEvent>,
    ) -> AppResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut manifests: HashMap<String, PluginManifest> = HashMap::new();
        let mut candidates = Vec::new();

        for record in self.store.find_all().await? {
            let manifest = match PluginManifest::from_record(&record).and_then(|m| {
                validator::validate_manifest(&m).into_result()?;
                Ok(m)
            }) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!(plugin = %record.name, error = %e, "Invalid plugin record");
                    report.invalid.push(record.name);
                    continue;
                }
            };

            if self.plugin_registry.contains(&record.name).await {
                debug!(plugin = %record.name, "Plugin already registered, skipping");
                continue;
            }

            match loader.cached(&record.name).await {
                Some(loaded) => {
                    candidates.push(loaded.plugin);
                    manifests.insert(record.name.clone(), manifest);
                }
                None => {
                    warn!(plugin = %record.name, "No loaded plugin for durable record");
                    report.orphaned.push(record.name);
                }
            }
        }

        for plugin in dependency_order(candidates) {
            let name = plugin.name.clone();
            let Some(mut manifest) = manifests.remove(&name) else {
                continue;
            };

            if let Err(e) = self.plugin_registry.register(plugin.clone()).await {
                error!(plugin = %name, error = %e, "Failed to restore plugin");
                report.failed.push(name);
                continue;
            }

            if manifest.version != plugin.version {
                info!(
                    plugin = %name,
                    from = %manifest.version,
                    to = %plugin.version,
                    "Plugin version changed"
                );
                let update = PluginRecordUpdate {
                    version: Some(plugin.version.clone()),
                    ..Default::default()
                };
                if let Err(e) = self.store.update(&name, &update).await {
                    warn!(plugin = %name, error = %e, "Failed to persist version change");
                }
                manifest.version = plugin.version.clone();
                manifest.updated_at = Utc::now().max(manifest.updated_at);
            }

            let enabled = manifest.enabled;
            manifest.enabled = false;
            self.plugin_registry.set_manifest(manifest).await;
            report.restored.push(name.clone());

            if enabled && !self.plugin_registry.is_active(&name).await {
                match self.activate_locked(&name, &mut *events).await {
                    Ok(()) => report.activated.push(name),
                    Err(e) => {
                        error!(plugin = %name, error = %e, "Failed to re-activate plugin");
                        if let Err(e) = self
                            .store
                            .update(&name, &PluginRecordUpdate::enabled(false))
                            .await
                        {
                            warn!(plugin = %name, error = %e, "Failed to persist disabled state");
                        }
                        report.failed.push(name);
                    }
                }
            } else if enabled {
                report.activated.push(name);
            }
        }

        Ok(report)
    }

    // ── Helpers ──────────────────────────────────────────────────

    async fn require(&self, name: &str) -> AppResult<Arc<Plugin>> {
        self.plugin_registry
            .get(name)
            .await
            .ok_or_else(|| AppError::not_found(format!("Plugin '{name}' is not installed")))
    }

    async fn current_config(&self, name: &str) -> Option<Map<String, Value>> {
        self.plugin_registry.manifest(name).await.and_then(|m| m.config)
    }

    fn context(&self, name: &str, config: Option<Map<String, Value>>) -> LifecycleContext {
        LifecycleContext {
            plugin: name.to_string(),
            config,
            registry: self.plugin_registry.clone(),
        }
    }

    fn check_config(plugin: &Plugin, config: &Map<String, Value>) -> AppResult<()> {
        let Some(schema) = &plugin.config_schema else {
            return Ok(());
        };
        let result = validator::validate_config(config, schema);
        if !result.valid {
            warn!(
                plugin = %plugin.name,
                errors = %result.errors.join("; "),
                "Plugin config validation failed"
            );
        }
        result.into_result()
    }

    async fn register_hooks(&self, plugin: &Plugin) {
        for decl in &plugin.hooks {
            self.hook_registry
                .register(&decl.hook, decl.handler.clone(), decl.priority, &plugin.name)
                .await;
        }
    }

    /// Runs one lifecycle callback under the callback timeout.
    async fn run_callback(
        &self,
        plugin: &Plugin,
        stage: LifecycleStage,
        ctx: &LifecycleContext,
    ) -> AppResult<()> {
        let lifecycle = plugin.lifecycle.clone();
        let call = async {
            match stage {
                LifecycleStage::Install => lifecycle.install(ctx).await,
                LifecycleStage::Activate => lifecycle.activate(ctx).await,
                LifecycleStage::Deactivate => lifecycle.deactivate(ctx).await,
                LifecycleStage::Uninstall => lifecycle.uninstall(ctx).await,
            }
        };

        match tokio::time::timeout(self.callback_timeout, call).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(cause)) => {
                error!(
                    plugin = %plugin.name,
                    stage = %stage,
                    error = %cause,
                    "Lifecycle callback failed"
                );
                Err(AppError::lifecycle(&plugin.name, stage, cause))
            }
            Err(_) => {
                error!(
                    plugin = %plugin.name,
                    stage = %stage,
                    timeout_ms = self.callback_timeout.as_millis() as u64,
                    "Lifecycle callback timed out"
                );
                Err(AppError::timeout(format!(
                    "Plugin '{}' {stage} callback timed out after {}ms",
                    plugin.name,
                    self.callback_timeout.as_millis()
                )))
            }
        }
    }

    async fn run_callback_best_effort(
        &self,
        plugin: &Plugin,
        stage: LifecycleStage,
        ctx: &LifecycleContext,
    ) {
        if self.run_callback(plugin, stage, ctx).await.is_err() {
            warn!(plugin = %plugin.name, stage = %stage, "Compensating callback failed");
        }
    }

    /// Fires lifecycle notifications. Handler failures are logged only.
    async fn emit(&self, events: Vec<PendingEvent>) {
        for (hook, event) in events {
            let plugin = event.plugin.clone();
            if let Err(e) = self.hook_dispatcher.execute_typed(&hook.typed(), event).await {
                warn!(hook = %hook, plugin = %plugin, error = %e, "Lifecycle notification failed");
            }
        }
    }
}
