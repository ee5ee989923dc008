//! Closure-based hook handlers.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use plughub_core::result::AppResult;

use super::definitions::HookContext;
use super::registry::HookHandler;

type HandlerFn =
    dyn Fn(Value, HookContext) -> BoxFuture<'static, AppResult<Option<Value>>> + Send + Sync;

/// A closure-based hook handler for quick handler creation.
pub struct FnHandler {
    /// Label shown in logs and debug output.
    label: String,
    /// Handler function.
    handler: Arc<HandlerFn>,
}

impl std::fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler")
            .field("label", &self.label)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl FnHandler {
    /// Creates a new closure-based handler.
    ///
    /// The closure receives owned copies of the threaded value and context.
    pub fn new<F, Fut>(label: &str, handler: F) -> Self
    where
        F: Fn(Value, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Option<Value>>> + Send + 'static,
    {
        Self {
            label: label.to_string(),
            handler: Arc::new(move |data, ctx| Box::pin(handler(data, ctx))),
        }
    }

    /// Creates a handler already wrapped as `Arc<dyn HookHandler>`.
    pub fn arc<F, Fut>(label: &str, handler: F) -> Arc<dyn HookHandler>
    where
        F: Fn(Value, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Option<Value>>> + Send + 'static,
    {
        Arc::new(Self::new(label, handler))
    }

    /// Returns the handler label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[async_trait]
impl HookHandler for FnHandler {
    async fn handle(&self, data: &Value, ctx: &HookContext) -> AppResult<Option<Value>> {
        (self.handler)(data.clone(), ctx.clone()).await
    }
}
