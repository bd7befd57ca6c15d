//! Generic JSON cache slots.

use anyhow::Result;
use sqlx::Row;
use tracing::{debug, error, warn};

use super::records::{require_key, CacheEntry};
use crate::errors::DatabaseError;
use super::Database;

impl Database {
    /// Overwrite the value stored under `key`
    pub async fn set_cache(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        require_key("key", key)?;
        let serialized =
            serde_json::to_string(value).map_err(|e| DatabaseError::SerializationError {
                reason: e.to_string(),
            })?;
        let _guard = self.writer().await;
        debug!("Writing cache entry: {}", key);

        match sqlx::query("INSERT OR REPLACE INTO cache (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(key)
            .bind(serialized)
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to write cache entry {}: {}", key, e);
                Err(e.into())
            }
        }
    }

    pub async fn get_cache(&self, key: &str) -> Result<Option<CacheEntry>> {
        let row = sqlx::query("SELECT key, value, updated_at FROM cache WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row.try_get("value")?;
        let value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding unparsable cache entry {}: {}", key, e);
                return Ok(None);
            }
        };

        Ok(Some(CacheEntry {
            key: row.try_get("key")?,
            value,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}
