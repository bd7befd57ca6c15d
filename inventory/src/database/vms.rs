//! Hypervisor VM inventory operations.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error};

use super::records::{require_key, VmRecord};
use super::Database;

fn vm_from_row(row: &SqliteRow) -> Result<VmRecord> {
    Ok(VmRecord {
        esxi_host: row.try_get("esxi_host")?,
        vm_name: row.try_get("vm_name")?,
        cpu_count: row.try_get("cpu_count")?,
        ram_mb: row.try_get("ram_mb")?,
        storage_gb: row.try_get("storage_gb")?,
        power_state: row.try_get("power_state")?,
        cpu_usage_mhz: row.try_get("cpu_usage_mhz")?,
        memory_usage_mb: row.try_get("memory_usage_mb")?,
        collected_at: row.try_get("collected_at")?,
    })
}

impl Database {
    /// Replace every VM owned by `esxi_host` with `vms` in one transaction.
    /// Records belonging to another host are skipped.
    pub async fn replace_vms_for_host(&self, esxi_host: &str, vms: &[VmRecord]) -> Result<()> {
        require_key("esxi_host", esxi_host)?;
        let _guard = self.writer().await;
        debug!("Replacing {} VMs for host: {}", vms.len(), esxi_host);

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM vm_info WHERE esxi_host = ?")
            .bind(esxi_host)
            .execute(&mut *tx)
            .await?;

        for vm in vms.iter().filter(|vm| vm.esxi_host == esxi_host) {
            if vm.vm_name.is_empty() {
                continue;
            }
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO vm_info (
                    esxi_host, vm_name, cpu_count, ram_mb, storage_gb,
                    power_state, cpu_usage_mhz, memory_usage_mb, collected_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&vm.esxi_host)
            .bind(&vm.vm_name)
            .bind(vm.cpu_count)
            .bind(vm.ram_mb)
            .bind(vm.storage_gb)
            .bind(&vm.power_state)
            .bind(vm.cpu_usage_mhz)
            .bind(vm.memory_usage_mb)
            .bind(vm.collected_at)
            .execute(&mut *tx)
            .await?;
        }

        if let Err(e) = tx.commit().await {
            error!("Failed to commit VM set for {}: {}", esxi_host, e);
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn get_vms_for_host(&self, esxi_host: &str) -> Result<Vec<VmRecord>> {
        let rows = sqlx::query("SELECT * FROM vm_info WHERE esxi_host = ? ORDER BY vm_name")
            .bind(esxi_host)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(vm_from_row).collect()
    }

    /// Look a VM up by name, optionally narrowed to one hypervisor
    pub async fn get_vm(&self, vm_name: &str, esxi_host: Option<&str>) -> Result<Option<VmRecord>> {
        let row = match esxi_host {
            Some(host) => {
                sqlx::query("SELECT * FROM vm_info WHERE vm_name = ? AND esxi_host = ?")
                    .bind(vm_name)
                    .bind(host)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM vm_info WHERE vm_name = ? ORDER BY esxi_host LIMIT 1")
                    .bind(vm_name)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        row.as_ref().map(vm_from_row).transpose()
    }

    pub async fn get_all_vms(&self) -> Result<Vec<VmRecord>> {
        let rows = sqlx::query("SELECT * FROM vm_info ORDER BY esxi_host, vm_name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(vm_from_row).collect()
    }
}
