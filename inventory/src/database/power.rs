//! Power controller readings.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error};

use super::records::{require_key, PowerRecord};
use super::Database;

fn power_from_row(row: &SqliteRow) -> Result<PowerRecord> {
    Ok(PowerRecord {
        host: row.try_get("host")?,
        power_watts: row.try_get("power_watts")?,
        power_average_watts: row.try_get("power_average_watts")?,
        power_max_watts: row.try_get("power_max_watts")?,
        power_min_watts: row.try_get("power_min_watts")?,
        collected_at: row.try_get("collected_at")?,
    })
}

impl Database {
    pub async fn upsert_power(&self, record: &PowerRecord) -> Result<()> {
        require_key("host", &record.host)?;
        let _guard = self.writer().await;
        debug!("Upserting power reading for: {}", record.host);

        match sqlx::query(
            r#"
            INSERT OR REPLACE INTO power_info (
                host, power_watts, power_average_watts, power_max_watts,
                power_min_watts, collected_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.host)
        .bind(record.power_watts)
        .bind(record.power_average_watts)
        .bind(record.power_max_watts)
        .bind(record.power_min_watts)
        .bind(record.collected_at)
        .execute(&self.pool)
        .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to upsert power reading for {}: {}", record.host, e);
                Err(e.into())
            }
        }
    }

    pub async fn get_power(&self, host: &str) -> Result<Option<PowerRecord>> {
        let row = sqlx::query("SELECT * FROM power_info WHERE host = ?")
            .bind(host)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(power_from_row).transpose()
    }

    pub async fn get_all_power(&self) -> Result<Vec<PowerRecord>> {
        let rows = sqlx::query("SELECT * FROM power_info ORDER BY host")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(power_from_row).collect()
    }
}
