//! CPU benchmark scores, keyed by the canonical name the source reported.

use anyhow::Result;
use sqlx::Row;
use std::collections::HashMap;
use tracing::{debug, error};

use super::records::{require_key, BenchmarkRecord};
use super::Database;

impl Database {
    pub async fn upsert_benchmark(&self, record: &BenchmarkRecord) -> Result<()> {
        require_key("cpu_name", &record.cpu_name)?;
        let _guard = self.writer().await;
        debug!("Saving benchmark for: {}", record.cpu_name);

        match sqlx::query(
            r#"
            INSERT INTO cpu_benchmark (cpu_name, multi_thread_score, single_thread_score, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(cpu_name) DO UPDATE SET
                multi_thread_score = excluded.multi_thread_score,
                single_thread_score = excluded.single_thread_score,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.cpu_name)
        .bind(record.multi_thread_score)
        .bind(record.single_thread_score)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to save benchmark for {}: {}", record.cpu_name, e);
                Err(e.into())
            }
        }
    }

    /// All benchmark rows in insertion order
    pub async fn get_all_benchmarks(&self) -> Result<Vec<BenchmarkRecord>> {
        let rows = sqlx::query(
            "SELECT cpu_name, multi_thread_score, single_thread_score FROM cpu_benchmark ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(BenchmarkRecord {
                cpu_name: row.try_get("cpu_name")?,
                multi_thread_score: row.try_get("multi_thread_score")?,
                single_thread_score: row.try_get("single_thread_score")?,
            });
        }
        Ok(records)
    }

    /// Remember that `query` resolved to the record stored under `cpu_name`
    pub async fn upsert_benchmark_alias(&self, query: &str, cpu_name: &str) -> Result<()> {
        require_key("query", query)?;
        require_key("cpu_name", cpu_name)?;
        let _guard = self.writer().await;

        match sqlx::query(
            r#"
            INSERT INTO cpu_benchmark_alias (query, cpu_name, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(query) DO UPDATE SET
                cpu_name = excluded.cpu_name,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(query)
        .bind(cpu_name)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to save benchmark alias {} -> {}: {}", query, cpu_name, e);
                Err(e.into())
            }
        }
    }

    /// Query to canonical name
    pub async fn get_all_benchmark_aliases(&self) -> Result<HashMap<String, String>> {
        let rows = sqlx::query("SELECT query, cpu_name FROM cpu_benchmark_alias")
            .fetch_all(&self.pool)
            .await?;

        let mut aliases = HashMap::with_capacity(rows.len());
        for row in rows {
            aliases.insert(row.try_get("query")?, row.try_get("cpu_name")?);
        }
        Ok(aliases)
    }

    /// Returns true when a row was removed. Aliases pointing at it go too.
    pub async fn delete_benchmark(&self, cpu_name: &str) -> Result<bool> {
        let _guard = self.writer().await;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM cpu_benchmark WHERE cpu_name = ?")
            .bind(cpu_name)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM cpu_benchmark_alias WHERE cpu_name = ?")
            .bind(cpu_name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
