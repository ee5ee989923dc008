//! Durable plugin record store contract.
//!
//! The store is the persisted mirror of the registry's manifests: one row
//! per installed plugin, keyed by the unique plugin name.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::result::AppResult;

/// A persisted plugin installation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    /// Row identifier.
    pub id: Uuid,
    /// Unique plugin name.
    pub name: String,
    /// Installed version.
    pub version: String,
    /// Whether the plugin is active.
    pub enabled: bool,
    /// Serialized plugin config (opaque JSON text).
    pub config: Option<String>,
    /// When the plugin was installed.
    pub installed_at: DateTime<Utc>,
    /// When the row was last changed.
    pub updated_at: DateTime<Utc>,
}

impl PluginRecord {
    /// Creates a new disabled record stamped with the current time.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            version: version.into(),
            enabled: false,
            config: None,
            installed_at: now,
            updated_at: now,
        }
    }

    /// Sets the serialized config.
    pub fn with_config(mut self, config: Option<String>) -> Self {
        self.config = config;
        self
    }
}

/// Partial update of a plugin record. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginRecordUpdate {
    /// New version.
    pub version: Option<String>,
    /// New enabled flag.
    pub enabled: Option<bool>,
    /// New serialized config.
    pub config: Option<String>,
}

impl PluginRecordUpdate {
    /// Update touching only the enabled flag.
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Default::default()
        }
    }

    /// Applies this update to a record, refreshing `updated_at`.
    pub fn apply_to(&self, record: &mut PluginRecord) {
        if let Some(version) = &self.version {
            record.version = version.clone();
        }
        if let Some(enabled) = self.enabled {
            record.enabled = enabled;
        }
        if let Some(config) = &self.config {
            record.config = Some(config.clone());
        }
        record.updated_at = Utc::now().max(record.updated_at);
    }
}

/// Persistence for plugin installation records.
#[async_trait]
pub trait PluginStore: Send + Sync + std::fmt::Debug {
    /// Inserts a new record. Fails if a record with the same name exists.
    async fn insert(&self, record: &PluginRecord) -> AppResult<()>;

    /// Applies a partial update to the record with the given name.
    async fn update(&self, name: &str, update: &PluginRecordUpdate) -> AppResult<()>;

    /// Deletes the record with the given name. Returns whether a row was removed.
    async fn delete(&self, name: &str) -> AppResult<bool>;

    /// Finds a record by plugin name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<PluginRecord>>;

    /// Returns every record (full table scan).
    async fn find_all(&self) -> AppResult<Vec<PluginRecord>>;
}
