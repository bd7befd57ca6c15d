//! Source adapters.
//!
//! One trait per upstream family. The collector only talks to these traits,
//! so tests can drive it with in-process fakes. Expected failures come back
//! as `SourceError` (or absent values for the metrics server); nothing here
//! panics on a malformed or unreachable upstream.

pub mod prometheus;
pub mod redfish;
pub mod vsphere;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Credentials, MountConfig, MountType, UpsTarget};
use crate::database::BenchmarkRecord;
use crate::errors::SourceError;

pub use prometheus::PrometheusClient;
pub use redfish::RedfishClient;
pub use vsphere::VsphereClient;

// ============================================================================
// Hypervisor
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub boot_time: Option<DateTime<Utc>>,
    pub uptime_seconds: Option<f64>,
    pub cpu_threads: Option<i64>,
    pub cpu_cores: Option<i64>,
    pub os_version: Option<String>,
    pub cpu_usage_percent: Option<f64>,
    pub memory_usage_percent: Option<f64>,
    pub memory_total_bytes: Option<f64>,
    pub memory_used_bytes: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VmSnapshot {
    pub name: String,
    pub cpu_count: Option<i64>,
    pub ram_mb: Option<i64>,
    pub storage_gb: Option<f64>,
    pub power_state: Option<String>,
    pub cpu_usage_mhz: Option<i64>,
    pub memory_usage_mb: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HypervisorSnapshot {
    pub host: HostSnapshot,
    pub vms: Vec<VmSnapshot>,
}

#[async_trait]
pub trait HypervisorSource: Send + Sync {
    /// Fetch host status and the current VM list for one hypervisor
    async fn fetch(
        &self,
        host: &str,
        credentials: &Credentials,
    ) -> Result<HypervisorSnapshot, SourceError>;
}

// ============================================================================
// Power controller
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerReading {
    pub power_watts: Option<f64>,
    pub power_average_watts: Option<f64>,
    pub power_max_watts: Option<f64>,
    pub power_min_watts: Option<f64>,
}

#[async_trait]
pub trait PowerSource: Send + Sync {
    async fn fetch_power(
        &self,
        host: &str,
        credentials: &Credentials,
    ) -> Result<PowerReading, SourceError>;
}

// ============================================================================
// Metrics server
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct UptimeSample {
    pub boot_time: Option<DateTime<Utc>>,
    pub uptime_seconds: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSample {
    pub cpu_usage_percent: Option<f64>,
    pub memory_usage_percent: Option<f64>,
    pub memory_total_bytes: Option<f64>,
    pub memory_used_bytes: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolSample {
    pub pool_name: String,
    pub size_bytes: Option<f64>,
    pub allocated_bytes: Option<f64>,
    pub free_bytes: Option<f64>,
    pub health: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageSample {
    pub size_bytes: f64,
    pub avail_bytes: f64,
    pub used_bytes: f64,
}

/// Point-in-time queries against the metrics server. Every failure is
/// reported as absent.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn uptime(&self, instance: &str, is_windows: bool) -> Option<UptimeSample>;

    async fn usage(&self, instance: &str, is_windows: bool) -> Option<UsageSample>;

    async fn zfs_pools(&self, instance: &str) -> Vec<PoolSample>;

    async fn mount(
        &self,
        mount: &MountConfig,
        mount_type: MountType,
        instance: &str,
    ) -> Option<StorageSample>;
}

// ============================================================================
// UPS daemon
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsVariables {
    pub model: Option<String>,
    pub battery_charge: Option<f64>,
    pub battery_runtime: Option<i64>,
    pub ups_load: Option<f64>,
    pub ups_status: Option<String>,
    pub ups_temperature: Option<f64>,
    pub input_voltage: Option<f64>,
    pub output_voltage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsSnapshot {
    pub ups_name: String,
    pub description: String,
    /// Absent when the daemon returned no variables for the device
    pub variables: Option<UpsVariables>,
    pub clients: Vec<String>,
}

#[async_trait]
pub trait UpsSource: Send + Sync {
    /// Every device on the daemon (filtered by `ups_name` when set) with its
    /// variables and clients
    async fn fetch_all(&self, target: &UpsTarget) -> Result<Vec<UpsSnapshot>, SourceError>;
}

// ============================================================================
// Benchmark site
// ============================================================================

#[async_trait]
pub trait BenchmarkSource: Send + Sync {
    /// Best accepted candidate for `cpu_name`, keyed by the name the site uses
    async fn search(&self, cpu_name: &str) -> Option<BenchmarkRecord>;
}
