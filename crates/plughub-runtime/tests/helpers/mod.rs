//! Shared fixtures for runtime integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use plughub_core::error::AppError;
use plughub_core::result::AppResult;
use plughub_core::traits::{PluginRecord, PluginRecordUpdate, PluginStore};
use plughub_runtime::hooks::{FnHandler, HookHandler, HookRegistry};
use plughub_runtime::lifecycle::{LifecycleContext, LifecycleStage, PluginLifecycle};
use plughub_runtime::{MemoryPluginStore, PluginManager, PluginRegistry};

/// Store whose writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryPluginStore,
    pub fail_insert: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }
}

#[async_trait]
impl PluginStore for FlakyStore {
    async fn insert(&self, record: &PluginRecord) -> AppResult<()> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(AppError::database("insert refused"));
        }
        self.inner.insert(record).await
    }

    async fn update(&self, name: &str, update: &PluginRecordUpdate) -> AppResult<()> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(AppError::database("update refused"));
        }
        self.inner.update(name, update).await
    }

    async fn delete(&self, name: &str) -> AppResult<bool> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::database("delete refused"));
        }
        self.inner.delete(name).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<PluginRecord>> {
        self.inner.find_by_name(name).await
    }

    async fn find_all(&self) -> AppResult<Vec<PluginRecord>> {
        self.inner.find_all().await
    }
}

/// Builds a manager over `store` with short timeouts.
pub fn manager_with(store: Arc<dyn PluginStore>) -> PluginManager {
    PluginManager::with_components(
        Arc::new(PluginRegistry::new()),
        Arc::new(HookRegistry::new()),
        store,
        Duration::from_secs(5),
        Duration::from_secs(5),
    )
}

/// Lifecycle that records every callback it receives.
#[derive(Debug, Default)]
pub struct Recorder {
    calls: Mutex<Vec<LifecycleStage>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<LifecycleStage> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, stage: LifecycleStage) -> AppResult<()> {
        self.calls.lock().unwrap().push(stage);
        Ok(())
    }
}

#[async_trait]
impl PluginLifecycle for Recorder {
    async fn install(&self, _ctx: &LifecycleContext) -> AppResult<()> {
        self.push(LifecycleStage::Install)
    }
    async fn activate(&self, _ctx: &LifecycleContext) -> AppResult<()> {
        tokio::task::yield_now().await;
        self.push(LifecycleStage::Activate)
    }
    async fn deactivate(&self, _ctx: &LifecycleContext) -> AppResult<()> {
        self.push(LifecycleStage::Deactivate)
    }
    async fn uninstall(&self, _ctx: &LifecycleContext) -> AppResult<()> {
        self.push(LifecycleStage::Uninstall)
    }
}

/// Handler that appends `tag` to the `trail` array of the threaded value.
pub fn tagging(tag: &'static str) -> Arc<dyn HookHandler> {
    FnHandler::arc(tag, move |mut data, _ctx| async move {
        if let Some(trail) = data.get_mut("trail").and_then(|t| t.as_array_mut()) {
            trail.push(serde_json::Value::from(tag));
        }
        Ok(Some(data))
    })
}

/// Handler that observes without returning a value.
pub fn observer() -> Arc<dyn HookHandler> {
    FnHandler::arc("observer", |_data, _ctx| async { Ok(None) })
}

/// Handler that always fails.
pub fn failing(message: &'static str) -> Arc<dyn HookHandler> {
    FnHandler::arc("failing", move |_data, _ctx| async move {
        Err(AppError::internal(message))
    })
}
