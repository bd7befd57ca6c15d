//! Database record types (entities).
//!
//! One struct per entity family. Records are created or overwritten only by
//! the collector and the benchmark resolver; every other component reads.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::keys;

/// Reject records whose key fields are empty
pub(crate) fn require_key(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("Record key '{}' must not be empty", field));
    }
    Ok(())
}

// ============================================================================
// Host state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Running,
    Unknown,
}

impl HostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostStatus::Running => keys::RUNNING,
            HostStatus::Unknown => keys::UNKNOWN,
        }
    }

    pub fn parse(value: &str) -> Self {
        if value == keys::RUNNING {
            HostStatus::Running
        } else {
            HostStatus::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    pub host: String,
    pub boot_time: Option<DateTime<Utc>>,
    pub uptime_seconds: Option<f64>,
    pub status: HostStatus,
    pub cpu_threads: Option<i64>,
    pub cpu_cores: Option<i64>,
    pub os_version: Option<String>,
    pub cpu_usage_percent: Option<f64>,
    pub memory_usage_percent: Option<f64>,
    pub memory_total_bytes: Option<f64>,
    pub memory_used_bytes: Option<f64>,
    pub collected_at: DateTime<Utc>,
}

impl HostRecord {
    /// A running host with no metrics filled in yet
    pub fn running(host: &str) -> Self {
        Self {
            status: HostStatus::Running,
            ..Self::degraded(host)
        }
    }

    /// Row written when a host could not be polled: status unknown, metrics null
    pub fn degraded(host: &str) -> Self {
        Self {
            host: host.to_string(),
            boot_time: None,
            uptime_seconds: None,
            status: HostStatus::Unknown,
            cpu_threads: None,
            cpu_cores: None,
            os_version: None,
            cpu_usage_percent: None,
            memory_usage_percent: None,
            memory_total_bytes: None,
            memory_used_bytes: None,
            collected_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum CollectionOutcome {
    Success,
    ConnectionFailed,
    /// The metrics server answered but had no data point for the host
    NoData,
    Error(String),
}

impl CollectionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CollectionOutcome::Success)
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "success" => CollectionOutcome::Success,
            "connection_failed" => CollectionOutcome::ConnectionFailed,
            "no_data" => CollectionOutcome::NoData,
            other => CollectionOutcome::Error(
                other.strip_prefix("error: ").unwrap_or(other).to_string(),
            ),
        }
    }
}

impl fmt::Display for CollectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionOutcome::Success => write!(f, "success"),
            CollectionOutcome::ConnectionFailed => write!(f, "connection_failed"),
            CollectionOutcome::NoData => write!(f, "no_data"),
            CollectionOutcome::Error(detail) => write!(f, "error: {}", detail),
        }
    }
}

impl From<CollectionOutcome> for String {
    fn from(outcome: CollectionOutcome) -> Self {
        outcome.to_string()
    }
}

impl From<String> for CollectionOutcome {
    fn from(value: String) -> Self {
        CollectionOutcome::parse(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionStatus {
    pub host: String,
    pub last_fetch: DateTime<Utc>,
    pub outcome: CollectionOutcome,
}

// ============================================================================
// Hypervisor inventory
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmRecord {
    pub esxi_host: String,
    pub vm_name: String,
    pub cpu_count: Option<i64>,
    pub ram_mb: Option<i64>,
    pub storage_gb: Option<f64>,
    pub power_state: Option<String>,
    pub cpu_usage_mhz: Option<i64>,
    pub memory_usage_mb: Option<i64>,
    pub collected_at: DateTime<Utc>,
}

// ============================================================================
// Power, storage and UPS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerRecord {
    pub host: String,
    pub power_watts: Option<f64>,
    pub power_average_watts: Option<f64>,
    pub power_max_watts: Option<f64>,
    pub power_min_watts: Option<f64>,
    pub collected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZfsPoolRecord {
    pub host: String,
    pub pool_name: String,
    pub size_bytes: Option<f64>,
    pub allocated_bytes: Option<f64>,
    pub free_bytes: Option<f64>,
    pub health: Option<f64>,
    pub collected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountRecord {
    pub host: String,
    pub mountpoint: String,
    pub size_bytes: Option<f64>,
    pub avail_bytes: Option<f64>,
    pub used_bytes: Option<f64>,
    pub collected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsRecord {
    pub ups_name: String,
    pub host: String,
    pub model: Option<String>,
    pub battery_charge: Option<f64>,
    pub battery_runtime: Option<i64>,
    pub ups_load: Option<f64>,
    pub ups_status: Option<String>,
    pub ups_temperature: Option<f64>,
    pub input_voltage: Option<f64>,
    pub output_voltage: Option<f64>,
    pub collected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsClientRecord {
    pub ups_name: String,
    pub host: String,
    pub client_ip: String,
    pub client_hostname: Option<String>,
    pub collected_at: DateTime<Utc>,
}

// ============================================================================
// Derived cache and benchmarks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Canonical name as reported by the benchmark source
    pub cpu_name: String,
    pub multi_thread_score: Option<i64>,
    pub single_thread_score: Option<i64>,
}
