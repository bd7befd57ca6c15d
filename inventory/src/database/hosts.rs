//! Host info and collection status operations.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error};

use super::records::{require_key, CollectionOutcome, CollectionStatus, HostRecord, HostStatus};
use super::Database;

fn host_from_row(row: &SqliteRow) -> Result<HostRecord> {
    let status: String = row.try_get("status")?;
    Ok(HostRecord {
        host: row.try_get("host")?,
        boot_time: row.try_get("boot_time")?,
        uptime_seconds: row.try_get("uptime_seconds")?,
        status: HostStatus::parse(&status),
        cpu_threads: row.try_get("cpu_threads")?,
        cpu_cores: row.try_get("cpu_cores")?,
        os_version: row.try_get("os_version")?,
        cpu_usage_percent: row.try_get("cpu_usage_percent")?,
        memory_usage_percent: row.try_get("memory_usage_percent")?,
        memory_total_bytes: row.try_get("memory_total_bytes")?,
        memory_used_bytes: row.try_get("memory_used_bytes")?,
        collected_at: row.try_get("collected_at")?,
    })
}

fn status_from_row(row: &SqliteRow) -> Result<CollectionStatus> {
    let outcome: String = row.try_get("status")?;
    Ok(CollectionStatus {
        host: row.try_get("host")?,
        last_fetch: row.try_get("last_fetch")?,
        outcome: CollectionOutcome::parse(&outcome),
    })
}

impl Database {
    /// Overwrite the whole host row; never a partial update
    pub async fn upsert_host(&self, record: &HostRecord) -> Result<()> {
        require_key("host", &record.host)?;
        let _guard = self.writer().await;
        debug!("Upserting host info for: {}", record.host);

        match sqlx::query(
            r#"
            INSERT OR REPLACE INTO host_info (
                host, boot_time, uptime_seconds, status, cpu_threads, cpu_cores,
                os_version, cpu_usage_percent, memory_usage_percent,
                memory_total_bytes, memory_used_bytes, collected_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.host)
        .bind(record.boot_time)
        .bind(record.uptime_seconds)
        .bind(record.status.as_str())
        .bind(record.cpu_threads)
        .bind(record.cpu_cores)
        .bind(&record.os_version)
        .bind(record.cpu_usage_percent)
        .bind(record.memory_usage_percent)
        .bind(record.memory_total_bytes)
        .bind(record.memory_used_bytes)
        .bind(record.collected_at)
        .execute(&self.pool)
        .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to upsert host info for {}: {}", record.host, e);
                Err(e.into())
            }
        }
    }

    pub async fn get_host(&self, host: &str) -> Result<Option<HostRecord>> {
        debug!("Querying host info for: {}", host);

        let row = sqlx::query("SELECT * FROM host_info WHERE host = ?")
            .bind(host)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(host_from_row).transpose()
    }

    pub async fn get_all_hosts(&self) -> Result<Vec<HostRecord>> {
        let rows = sqlx::query("SELECT * FROM host_info ORDER BY host")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(host_from_row).collect()
    }

    pub async fn upsert_collection_status(&self, status: &CollectionStatus) -> Result<()> {
        require_key("host", &status.host)?;
        let _guard = self.writer().await;
        debug!("Recording collection status {} for: {}", status.outcome, status.host);

        sqlx::query(
            "INSERT OR REPLACE INTO collection_status (host, last_fetch, status) VALUES (?, ?, ?)",
        )
        .bind(&status.host)
        .bind(status.last_fetch)
        .bind(status.outcome.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to record collection status for {}: {}", status.host, e);
            e
        })?;

        Ok(())
    }

    pub async fn get_collection_status(&self, host: &str) -> Result<Option<CollectionStatus>> {
        let row = sqlx::query("SELECT host, last_fetch, status FROM collection_status WHERE host = ?")
            .bind(host)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(status_from_row).transpose()
    }

    pub async fn get_all_collection_status(&self) -> Result<Vec<CollectionStatus>> {
        let rows = sqlx::query("SELECT host, last_fetch, status FROM collection_status ORDER BY host")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(status_from_row).collect()
    }
}
