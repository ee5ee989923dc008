//! In-memory [`PluginStore`] used when no database is configured and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use plughub_core::error::AppError;
use plughub_core::result::AppResult;
use plughub_core::traits::{PluginRecord, PluginRecordUpdate, PluginStore};

/// Plugin records held in process memory.
#[derive(Debug, Default)]
pub struct MemoryPluginStore {
    /// Plugin name → record.
    records: RwLock<HashMap<String, PluginRecord>>,
}

impl MemoryPluginStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `records`.
    pub fn with_records(records: Vec<PluginRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.name.clone(), r)).collect()),
        }
    }
}

#[async_trait]
impl PluginStore for MemoryPluginStore {
    async fn insert(&self, record: &PluginRecord) -> AppResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.name) {
            return Err(AppError::database(format!(
                "Plugin record '{}' already exists",
                record.name
            )));
        }
        records.insert(record.name.clone(), record.clone());
        Ok(())
    }

    async fn update(&self, name: &str, update: &PluginRecordUpdate) -> AppResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(name)
            .ok_or_else(|| AppError::not_found(format!("Plugin record '{name}' not found")))?;
        update.apply_to(record);
        Ok(())
    }

    async fn delete(&self, name: &str) -> AppResult<bool> {
        let mut records = self.records.write().await;
        Ok(records.remove(name).is_some())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<PluginRecord>> {
        let records = self.records.read().await;
        Ok(records.get(name).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<PluginRecord>> {
        let records = self.records.read().await;
        let mut all: Vec<PluginRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}
