//! Hook registry — handlers registered per hook name in priority order.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use plughub_core::result::AppResult;

use super::definitions::HookContext;

/// Trait for hook handler implementations.
///
/// Returning `Ok(Some(value))` replaces the threaded value for the next
/// handler; `Ok(None)` leaves it unchanged.
#[async_trait]
pub trait HookHandler: Send + Sync + std::fmt::Debug {
    /// Handles a hook invocation.
    async fn handle(&self, data: &Value, ctx: &HookContext) -> AppResult<Option<Value>>;
}

/// A registered handler with its owner and priority.
#[derive(Debug, Clone)]
pub struct HookRegistration {
    /// The handler.
    pub handler: Arc<dyn HookHandler>,
    /// Priority (higher = earlier execution).
    pub priority: i32,
    /// Plugin that registered this handler.
    pub plugin_name: String,
    /// Registration order; breaks ties between equal priorities.
    pub sequence: u64,
}

/// Registry of hook handlers organized by hook name.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Hook name → handlers sorted by descending priority.
    handlers: RwLock<HashMap<String, Vec<HookRegistration>>>,
    /// Next registration sequence number.
    next_sequence: AtomicU64,
}

/// Registrations taken out of the registry, keyed by hook name.
pub type DetachedHooks = Vec<(String, HookRegistration)>;

fn sort_entries(entries: &mut [HookRegistration]) {
    entries.sort_by_key(|e| (Reverse(e.priority), e.sequence));
}

fn same_handler(a: &Arc<dyn HookHandler>, b: &Arc<dyn HookHandler>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a hook on behalf of `plugin_name`.
    pub async fn register(
        &self,
        hook: &str,
        handler: Arc<dyn HookHandler>,
        priority: i32,
        plugin_name: &str,
    ) {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let mut handlers = self.handlers.write().await;
        let entries = handlers.entry(hook.to_string()).or_default();

        entries.push(HookRegistration {
            handler,
            priority,
            plugin_name: plugin_name.to_string(),
            sequence,
        });
        sort_entries(entries);

        info!(
            hook = %hook,
            plugin = %plugin_name,
            priority = priority,
            "Hook handler registered"
        );
    }

    /// Removes a single registration by handler identity.
    pub async fn unregister(&self, hook: &str, handler: &Arc<dyn HookHandler>) -> bool {
        let mut handlers = self.handlers.write().await;
        let Some(entries) = handlers.get_mut(hook) else {
            return false;
        };

        let before = entries.len();
        if let Some(pos) = entries.iter().position(|e| same_handler(&e.handler, handler)) {
            entries.remove(pos);
        }
        let removed = entries.len() < before;

        if entries.is_empty() {
            handlers.remove(hook);
        }

        if removed {
            debug!(hook = %hook, "Hook handler unregistered");
        }
        removed
    }

    /// Unregisters all handlers for a specific plugin. Returns how many were removed.
    pub async fn unregister_plugin(&self, plugin_name: &str) -> usize {
        let mut handlers = self.handlers.write().await;
        let mut removed = 0;

        for entries in handlers.values_mut() {
            let before = entries.len();
            entries.retain(|e| e.plugin_name != plugin_name);
            removed += before - entries.len();
        }

        handlers.retain(|_, entries| !entries.is_empty());

        info!(plugin = %plugin_name, removed = removed, "All hooks unregistered for plugin");
        removed
    }

    /// Removes all handlers for a plugin and hands them back, so that
    /// [`restore`](Self::restore) can put them back in their old positions.
    pub async fn detach_plugin(&self, plugin_name: &str) -> DetachedHooks {
        let mut handlers = self.handlers.write().await;
        let mut detached = Vec::new();

        for (hook, entries) in handlers.iter_mut() {
            let (taken, kept): (Vec<_>, Vec<_>) = entries
                .drain(..)
                .partition(|e| e.plugin_name == plugin_name);
            *entries = kept;
            detached.extend(taken.into_iter().map(|e| (hook.clone(), e)));
        }

        handlers.retain(|_, entries| !entries.is_empty());

        debug!(plugin = %plugin_name, detached = detached.len(), "Hooks detached for plugin");
        detached
    }

    /// Re-inserts previously detached registrations, keeping their original
    /// sequence numbers.
    pub async fn restore(&self, detached: DetachedHooks) {
        let mut handlers = self.handlers.write().await;
        let restored = detached.len();

        for (hook, registration) in detached {
            let entries = handlers.entry(hook).or_default();
            entries.push(registration);
            sort_entries(entries);
        }

        debug!(restored = restored, "Hook registrations restored");
    }

    /// Returns the registrations for a hook, in execution order.
    pub async fn handlers(&self, hook: &str) -> Vec<HookRegistration> {
        let handlers = self.handlers.read().await;
        handlers.get(hook).cloned().unwrap_or_default()
    }

    /// Returns whether any handlers are registered for a hook.
    pub async fn has(&self, hook: &str) -> bool {
        let handlers = self.handlers.read().await;
        handlers.get(hook).is_some_and(|entries| !entries.is_empty())
    }

    /// Returns the number of handlers registered for a hook.
    pub async fn handler_count(&self, hook: &str) -> usize {
        let handlers = self.handlers.read().await;
        handlers.get(hook).map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns all hook names with at least one handler, sorted.
    pub async fn registered_hook_names(&self) -> Vec<String> {
        let handlers = self.handlers.read().await;
        let mut names: Vec<String> = handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::handler::FnHandler;

    fn noop() -> Arc<dyn HookHandler> {
        FnHandler::arc("noop", |_data, _ctx| async { Ok(None) })
    }

    #[tokio::test]
    async fn test_sorted_by_descending_priority_stable() {
        let registry = HookRegistry::new();
        registry.register("save", noop(), 1, "a").await;
        registry.register("save", noop(), 10, "b").await;
        registry.register("save", noop(), 5, "c").await;
        registry.register("save", noop(), 5, "d").await;

        let order: Vec<String> = registry
            .handlers("save")
            .await
            .into_iter()
            .map(|r| r.plugin_name)
            .collect();
        assert_eq!(order, vec!["b", "c", "d", "a"]);
    }

    #[tokio::test]
    async fn test_restore_keeps_original_positions() {
        let registry = HookRegistry::new();
        registry.register("save", noop(), 0, "a").await;
        registry.register("save", noop(), 0, "b").await;
        registry.register("save", noop(), 5, "a").await;
        registry.register("render", noop(), 0, "a").await;

        let detached = registry.detach_plugin("a").await;
        assert_eq!(detached.len(), 3);
        assert!(!registry.has("render").await);

        registry.register("save", noop(), 0, "c").await;
        registry.restore(detached).await;

        let order: Vec<String> = registry
            .handlers("save")
            .await
            .into_iter()
            .map(|r| r.plugin_name)
            .collect();
        assert_eq!(order, vec!["a", "a", "b", "c"]);
        assert_eq!(registry.handler_count("render").await, 1);
    }

    #[tokio::test]
    async fn test_unregister_by_identity() {
        let registry = HookRegistry::new();
        let keep = noop();
        let drop = noop();
        registry.register("save", keep.clone(), 0, "a").await;
        registry.register("save", drop.clone(), 0, "a").await;

        assert!(registry.unregister("save", &drop).await);
        assert!(!registry.unregister("save", &drop).await);
        assert_eq!(registry.handler_count("save").await, 1);

        assert!(registry.unregister("save", &keep).await);
        assert!(!registry.has("save").await);
        assert!(registry.registered_hook_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_plugin_drops_empty_hooks() {
        let registry = HookRegistry::new();
        registry.register("save", noop(), 0, "a").await;
        registry.register("save", noop(), 0, "b").await;
        registry.register("render", noop(), 0, "a").await;

        assert_eq!(registry.unregister_plugin("a").await, 2);
        assert_eq!(registry.registered_hook_names().await, vec!["save".to_string()]);
        assert!(
            registry
                .handlers("save")
                .await
                .iter()
                .all(|r| r.plugin_name == "b")
        );
    }
}
