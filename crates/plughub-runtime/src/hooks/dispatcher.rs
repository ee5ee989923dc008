//! Hook dispatcher — threads a value through a hook's handlers.
//!
//! - Handlers are called one at a time in descending priority order.
//! - Each handler sees the value produced by the previous one; `None`
//!   leaves it unchanged.
//! - The first failing (or timed-out) handler aborts the chain; the caller
//!   receives a `HookExecution` error naming the hook and owning plugin.
//! - A hook with no handlers returns the input unchanged.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error};

use plughub_core::error::AppError;
use plughub_core::result::AppResult;

use super::definitions::{HookContext, TypedHook};
use super::registry::HookRegistry;

/// Default per-handler time budget.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes hooks against the handlers in a [`HookRegistry`].
#[derive(Debug)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// Upper bound for one handler invocation.
    handler_timeout: Duration,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher with the default handler timeout.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self::with_timeout(registry, DEFAULT_HANDLER_TIMEOUT)
    }

    /// Creates a new hook dispatcher with a custom handler timeout.
    pub fn with_timeout(registry: Arc<HookRegistry>, handler_timeout: Duration) -> Self {
        Self {
            registry,
            handler_timeout,
        }
    }

    /// Runs every handler of `hook` over `data` and returns the final value.
    ///
    /// `overrides` is passed to each handler through [`HookContext::new`].
    pub async fn execute(
        &self,
        hook: &str,
        data: Value,
        overrides: Option<Map<String, Value>>,
    ) -> AppResult<Value> {
        // Snapshot so handlers may touch the registry without deadlocking
        let handlers = self.registry.handlers(hook).await;

        if handlers.is_empty() {
            return Ok(data);
        }

        debug!(hook = %hook, handler_count = handlers.len(), "Executing hook");

        let overrides = overrides.unwrap_or_default();
        let mut value = data;

        for registration in &handlers {
            let ctx = HookContext::new(hook, &registration.plugin_name, overrides.clone());

            let outcome =
                tokio::time::timeout(self.handler_timeout, registration.handler.handle(&value, &ctx))
                    .await;

            match outcome {
                Ok(Ok(Some(next))) => value = next,
                Ok(Ok(None)) => {}
                Ok(Err(cause)) => {
                    error!(
                        hook = %hook,
                        plugin = %registration.plugin_name,
                        error = %cause,
                        "Hook handler failed"
                    );
                    return Err(AppError::hook_execution(
                        hook,
                        &registration.plugin_name,
                        cause,
                    ));
                }
                Err(_) => {
                    error!(
                        hook = %hook,
                        plugin = %registration.plugin_name,
                        timeout_ms = self.handler_timeout.as_millis() as u64,
                        "Hook handler timed out"
                    );
                    let cause = AppError::timeout(format!(
                        "Handler timed out after {}ms",
                        self.handler_timeout.as_millis()
                    ));
                    return Err(AppError::hook_execution(
                        hook,
                        &registration.plugin_name,
                        cause,
                    ));
                }
            }
        }

        Ok(value)
    }

    /// Typed variant of [`execute`](Self::execute): serializes `data` in and
    /// deserializes the threaded result back into `T`.
    pub async fn execute_typed<T>(&self, hook: &TypedHook<T>, data: T) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let value = serde_json::to_value(data)?;
        let result = self.execute(hook.name(), value, None).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}
