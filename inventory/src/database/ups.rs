//! UPS devices and the clients attached to them.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error};

use super::records::{require_key, UpsClientRecord, UpsRecord};
use super::Database;

fn ups_from_row(row: &SqliteRow) -> Result<UpsRecord> {
    Ok(UpsRecord {
        ups_name: row.try_get("ups_name")?,
        host: row.try_get("host")?,
        model: row.try_get("model")?,
        battery_charge: row.try_get("battery_charge")?,
        battery_runtime: row.try_get("battery_runtime")?,
        ups_load: row.try_get("ups_load")?,
        ups_status: row.try_get("ups_status")?,
        ups_temperature: row.try_get("ups_temperature")?,
        input_voltage: row.try_get("input_voltage")?,
        output_voltage: row.try_get("output_voltage")?,
        collected_at: row.try_get("collected_at")?,
    })
}

fn client_from_row(row: &SqliteRow) -> Result<UpsClientRecord> {
    Ok(UpsClientRecord {
        ups_name: row.try_get("ups_name")?,
        host: row.try_get("host")?,
        client_ip: row.try_get("client_ip")?,
        client_hostname: row.try_get("client_hostname")?,
        collected_at: row.try_get("collected_at")?,
    })
}

impl Database {
    pub async fn upsert_ups(&self, record: &UpsRecord) -> Result<()> {
        require_key("ups_name", &record.ups_name)?;
        require_key("host", &record.host)?;
        let _guard = self.writer().await;
        debug!("Upserting UPS {} on {}", record.ups_name, record.host);

        match sqlx::query(
            r#"
            INSERT OR REPLACE INTO ups_info (
                ups_name, host, model, battery_charge, battery_runtime, ups_load,
                ups_status, ups_temperature, input_voltage, output_voltage, collected_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.ups_name)
        .bind(&record.host)
        .bind(&record.model)
        .bind(record.battery_charge)
        .bind(record.battery_runtime)
        .bind(record.ups_load)
        .bind(&record.ups_status)
        .bind(record.ups_temperature)
        .bind(record.input_voltage)
        .bind(record.output_voltage)
        .bind(record.collected_at)
        .execute(&self.pool)
        .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Failed to upsert UPS {} on {}: {}", record.ups_name, record.host, e);
                Err(e.into())
            }
        }
    }

    pub async fn get_ups(&self, ups_name: &str, host: &str) -> Result<Option<UpsRecord>> {
        let row = sqlx::query("SELECT * FROM ups_info WHERE ups_name = ? AND host = ?")
            .bind(ups_name)
            .bind(host)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(ups_from_row).transpose()
    }

    pub async fn get_all_ups(&self) -> Result<Vec<UpsRecord>> {
        let rows = sqlx::query("SELECT * FROM ups_info ORDER BY host, ups_name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(ups_from_row).collect()
    }

    pub async fn replace_ups_clients(
        &self,
        ups_name: &str,
        host: &str,
        clients: &[UpsClientRecord],
    ) -> Result<()> {
        require_key("ups_name", ups_name)?;
        require_key("host", host)?;
        let _guard = self.writer().await;
        debug!("Replacing {} clients for UPS {} on {}", clients.len(), ups_name, host);

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM ups_client WHERE ups_name = ? AND host = ?")
            .bind(ups_name)
            .bind(host)
            .execute(&mut *tx)
            .await?;

        for client in clients
            .iter()
            .filter(|c| c.ups_name == ups_name && c.host == host)
        {
            sqlx::query(
                r#"
                INSERT INTO ups_client (ups_name, host, client_ip, client_hostname, collected_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&client.ups_name)
            .bind(&client.host)
            .bind(&client.client_ip)
            .bind(&client.client_hostname)
            .bind(client.collected_at)
            .execute(&mut *tx)
            .await?;
        }

        if let Err(e) = tx.commit().await {
            error!("Failed to commit client set for UPS {} on {}: {}", ups_name, host, e);
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn get_ups_clients(&self, ups_name: &str, host: &str) -> Result<Vec<UpsClientRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM ups_client WHERE ups_name = ? AND host = ? ORDER BY client_ip",
        )
        .bind(ups_name)
        .bind(host)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(client_from_row).collect()
    }
}
