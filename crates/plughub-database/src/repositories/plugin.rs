//! Plugin record repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use plughub_core::error::{AppError, ErrorKind};
use plughub_core::result::AppResult;
use plughub_core::traits::{PluginRecord, PluginRecordUpdate, PluginStore};

/// Row shape of the `plugins` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PluginRow {
    id: Uuid,
    name: String,
    version: String,
    enabled: bool,
    config: Option<String>,
    installed_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PluginRow> for PluginRecord {
    fn from(row: PluginRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            version: row.version,
            enabled: row.enabled,
            config: row.config,
            installed_at: row.installed_at,
            updated_at: row.updated_at,
        }
    }
}

/// [`PluginStore`] backed by the `plugins` table.
#[derive(Debug, Clone)]
pub struct PgPluginStore {
    pool: PgPool,
}

impl PgPluginStore {
    /// Create a new plugin store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PluginStore for PgPluginStore {
    async fn insert(&self, record: &PluginRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO plugins (id, name, version, enabled, config, installed_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.version)
        .bind(record.enabled)
        .bind(&record.config)
        .bind(record.installed_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            let message = if unique {
                format!("Plugin record '{}' already exists", record.name)
            } else {
                "Failed to insert plugin record".to_string()
            };
            AppError::with_source(ErrorKind::Database, message, e)
        })?;

        debug!(plugin = %record.name, "Plugin record inserted");
        Ok(())
    }

    async fn update(&self, name: &str, update: &PluginRecordUpdate) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE plugins SET \
                version = COALESCE($2, version), \
                enabled = COALESCE($3, enabled), \
                config = COALESCE($4, config), \
                updated_at = GREATEST(NOW(), updated_at) \
             WHERE name = $1",
        )
        .bind(name)
        .bind(&update.version)
        .bind(update.enabled)
        .bind(&update.config)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update plugin record", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Plugin record '{name}' not found"
            )));
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM plugins WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete plugin record", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<PluginRecord>> {
        sqlx::query_as::<_, PluginRow>("SELECT * FROM plugins WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(PluginRecord::from))
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find plugin record", e)
            })
    }

    async fn find_all(&self) -> AppResult<Vec<PluginRecord>> {
        sqlx::query_as::<_, PluginRow>("SELECT * FROM plugins ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map(|rows| rows.into_iter().map(PluginRecord::from).collect())
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list plugin records", e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_into_record() {
        let now = Utc::now();
        let row = PluginRow {
            id: Uuid::now_v7(),
            name: "seo".to_string(),
            version: "1.0.0".to_string(),
            enabled: true,
            config: Some("{}".to_string()),
            installed_at: now,
            updated_at: now,
        };
        let record = PluginRecord::from(row.clone());
        assert_eq!(record.id, row.id);
        assert_eq!(record.name, "seo");
        assert!(record.enabled);
        assert_eq!(record.config.as_deref(), Some("{}"));
    }
}
