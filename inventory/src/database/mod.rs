//! Local store for the inventory service.
//!
//! This module provides SQLite persistence for every entity family. Each
//! family lives in its own table and follows one of two write shapes:
//! - upsert keyed by owner (host info, power, collection status, UPS,
//!   cache entries, benchmarks)
//! - replace-on-collect (VMs, ZFS pools, mounts, UPS clients): delete every
//!   row for the owner and insert the current set inside one transaction
//!
//! All writes are serialized through a single lock. Reads are not locked.
//!
//! The module is organized into submodules:
//! - `records` - All record types (entities)
//! - `hosts` - Host info and collection status
//! - `vms` - Hypervisor VM inventory
//! - `power` - Power controller readings
//! - `storage` - ZFS pools and mount points
//! - `ups` - UPS devices and their clients
//! - `cache` - Generic JSON cache slots
//! - `benchmarks` - CPU benchmark scores and query aliases

mod benchmarks;
mod cache;
mod hosts;
mod power;
mod records;
mod storage;
mod ups;
mod vms;

pub use records::*;

use crate::errors::DatabaseError;
use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info};

pub struct Database {
    pool: Pool<Sqlite>,
    write_lock: Mutex<()>,
}

const SCHEMA: &[(&str, &str)] = &[
    (
        "host_info",
        r#"
        CREATE TABLE IF NOT EXISTS host_info (
            host TEXT PRIMARY KEY,
            boot_time DATETIME,
            uptime_seconds REAL,
            status TEXT NOT NULL,
            cpu_threads INTEGER,
            cpu_cores INTEGER,
            os_version TEXT,
            cpu_usage_percent REAL,
            memory_usage_percent REAL,
            memory_total_bytes REAL,
            memory_used_bytes REAL,
            collected_at DATETIME NOT NULL
        )
        "#,
    ),
    (
        "collection_status",
        r#"
        CREATE TABLE IF NOT EXISTS collection_status (
            host TEXT PRIMARY KEY,
            last_fetch DATETIME NOT NULL,
            status TEXT NOT NULL
        )
        "#,
    ),
    (
        "vm_info",
        r#"
        CREATE TABLE IF NOT EXISTS vm_info (
            esxi_host TEXT NOT NULL,
            vm_name TEXT NOT NULL,
            cpu_count INTEGER,
            ram_mb INTEGER,
            storage_gb REAL,
            power_state TEXT,
            cpu_usage_mhz INTEGER,
            memory_usage_mb INTEGER,
            collected_at DATETIME NOT NULL,
            PRIMARY KEY (esxi_host, vm_name)
        )
        "#,
    ),
    (
        "power_info",
        r#"
        CREATE TABLE IF NOT EXISTS power_info (
            host TEXT PRIMARY KEY,
            power_watts REAL,
            power_average_watts REAL,
            power_max_watts REAL,
            power_min_watts REAL,
            collected_at DATETIME NOT NULL
        )
        "#,
    ),
    (
        "zfs_pool_info",
        r#"
        CREATE TABLE IF NOT EXISTS zfs_pool_info (
            host TEXT NOT NULL,
            pool_name TEXT NOT NULL,
            size_bytes REAL,
            allocated_bytes REAL,
            free_bytes REAL,
            health REAL,
            collected_at DATETIME NOT NULL,
            PRIMARY KEY (host, pool_name)
        )
        "#,
    ),
    (
        "mount_info",
        r#"
        CREATE TABLE IF NOT EXISTS mount_info (
            host TEXT NOT NULL,
            mountpoint TEXT NOT NULL,
            size_bytes REAL,
            avail_bytes REAL,
            used_bytes REAL,
            collected_at DATETIME NOT NULL,
            PRIMARY KEY (host, mountpoint)
        )
        "#,
    ),
    (
        "ups_info",
        r#"
        CREATE TABLE IF NOT EXISTS ups_info (
            ups_name TEXT NOT NULL,
            host TEXT NOT NULL,
            model TEXT,
            battery_charge REAL,
            battery_runtime INTEGER,
            ups_load REAL,
            ups_status TEXT,
            ups_temperature REAL,
            input_voltage REAL,
            output_voltage REAL,
            collected_at DATETIME NOT NULL,
            PRIMARY KEY (ups_name, host)
        )
        "#,
    ),
    (
        "ups_client",
        r#"
        CREATE TABLE IF NOT EXISTS ups_client (
            ups_name TEXT NOT NULL,
            host TEXT NOT NULL,
            client_ip TEXT NOT NULL,
            client_hostname TEXT,
            collected_at DATETIME NOT NULL
        )
        "#,
    ),
    (
        "cache",
        r#"
        CREATE TABLE IF NOT EXISTS cache (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
    ),
    (
        "cpu_benchmark",
        r#"
        CREATE TABLE IF NOT EXISTS cpu_benchmark (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cpu_name TEXT UNIQUE NOT NULL,
            multi_thread_score INTEGER,
            single_thread_score INTEGER,
            updated_at DATETIME NOT NULL
        )
        "#,
    ),
    (
        "cpu_benchmark_alias",
        r#"
        CREATE TABLE IF NOT EXISTS cpu_benchmark_alias (
            query TEXT PRIMARY KEY,
            cpu_name TEXT NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_vm_info_name ON vm_info(vm_name)",
    "CREATE INDEX IF NOT EXISTS idx_ups_client_owner ON ups_client(ups_name, host)",
];

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        info!("Opening database at {}", database_path);

        if let Some(parent) = Path::new(database_path).parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                error!("FAILED to create parent directory {:?}: {}", parent, e);
                return Err(e.into());
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path);
        let pool = match SqlitePool::connect(&database_url).await {
            Ok(pool) => pool,
            Err(e) => {
                error!("FAILED to connect to database {}: {}", database_url, e);
                return Err(DatabaseError::ConnectionFailed {
                    reason: e.to_string(),
                }
                .into());
            }
        };

        let database = Self {
            pool,
            write_lock: Mutex::new(()),
        };
        database.initialize_tables().await?;

        info!("Database initialized at {}", database_path);
        Ok(database)
    }

    /// Private in-memory database, used by tests and dry runs
    pub async fn in_memory() -> Result<Self> {
        // The schema lives only as long as its single connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let database = Self {
            pool,
            write_lock: Mutex::new(()),
        };
        database.initialize_tables().await?;
        Ok(database)
    }

    async fn initialize_tables(&self) -> Result<()> {
        for (table, sql) in SCHEMA {
            if let Err(e) = sqlx::query(sql).execute(&self.pool).await {
                error!("FAILED to create {} table: {}", table, e);
                return Err(e.into());
            }
        }

        for sql in INDEXES {
            if let Err(e) = sqlx::query(sql).execute(&self.pool).await {
                error!("FAILED to create index: {}", e);
                return Err(e.into());
            }
        }

        info!("All {} tables and indexes created", SCHEMA.len());
        Ok(())
    }

    /// Serialize writers; held for the duration of one logical write
    pub(crate) async fn writer(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}
