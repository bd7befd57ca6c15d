//! ZFS pool and mount point operations. Both are replace-on-collect per host.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error};

use super::records::{require_key, MountRecord, ZfsPoolRecord};
use super::Database;

fn pool_from_row(row: &SqliteRow) -> Result<ZfsPoolRecord> {
    Ok(ZfsPoolRecord {
        host: row.try_get("host")?,
        pool_name: row.try_get("pool_name")?,
        size_bytes: row.try_get("size_bytes")?,
        allocated_bytes: row.try_get("allocated_bytes")?,
        free_bytes: row.try_get("free_bytes")?,
        health: row.try_get("health")?,
        collected_at: row.try_get("collected_at")?,
    })
}

fn mount_from_row(row: &SqliteRow) -> Result<MountRecord> {
    Ok(MountRecord {
        host: row.try_get("host")?,
        mountpoint: row.try_get("mountpoint")?,
        size_bytes: row.try_get("size_bytes")?,
        avail_bytes: row.try_get("avail_bytes")?,
        used_bytes: row.try_get("used_bytes")?,
        collected_at: row.try_get("collected_at")?,
    })
}

impl Database {
    pub async fn replace_zfs_pools_for_host(&self, host: &str, pools: &[ZfsPoolRecord]) -> Result<()> {
        require_key("host", host)?;
        let _guard = self.writer().await;
        debug!("Replacing {} ZFS pools for host: {}", pools.len(), host);

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM zfs_pool_info WHERE host = ?")
            .bind(host)
            .execute(&mut *tx)
            .await?;

        for pool in pools.iter().filter(|p| p.host == host) {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO zfs_pool_info (
                    host, pool_name, size_bytes, allocated_bytes, free_bytes,
                    health, collected_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&pool.host)
            .bind(&pool.pool_name)
            .bind(pool.size_bytes)
            .bind(pool.allocated_bytes)
            .bind(pool.free_bytes)
            .bind(pool.health)
            .bind(pool.collected_at)
            .execute(&mut *tx)
            .await?;
        }

        if let Err(e) = tx.commit().await {
            error!("Failed to commit ZFS pool set for {}: {}", host, e);
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn get_zfs_pools(&self, host: &str) -> Result<Vec<ZfsPoolRecord>> {
        let rows = sqlx::query("SELECT * FROM zfs_pool_info WHERE host = ? ORDER BY pool_name")
            .bind(host)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(pool_from_row).collect()
    }

    pub async fn replace_mounts_for_host(&self, host: &str, mounts: &[MountRecord]) -> Result<()> {
        require_key("host", host)?;
        let _guard = self.writer().await;
        debug!("Replacing {} mounts for host: {}", mounts.len(), host);

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM mount_info WHERE host = ?")
            .bind(host)
            .execute(&mut *tx)
            .await?;

        for mount in mounts.iter().filter(|m| m.host == host) {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO mount_info (
                    host, mountpoint, size_bytes, avail_bytes, used_bytes, collected_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&mount.host)
            .bind(&mount.mountpoint)
            .bind(mount.size_bytes)
            .bind(mount.avail_bytes)
            .bind(mount.used_bytes)
            .bind(mount.collected_at)
            .execute(&mut *tx)
            .await?;
        }

        if let Err(e) = tx.commit().await {
            error!("Failed to commit mount set for {}: {}", host, e);
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn get_mounts(&self, host: &str) -> Result<Vec<MountRecord>> {
        let rows = sqlx::query("SELECT * FROM mount_info WHERE host = ? ORDER BY mountpoint")
            .bind(host)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(mount_from_row).collect()
    }
}
