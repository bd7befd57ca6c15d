// File: inventory/src/reachability.rs
//! Host reachability and the read-side degrade policy.
//!
//! A host is reachable when its latest collection outcome is `success`.
//! Reads for unreachable hosts still return the last known record, but
//! current-state fields (VM power state, host status) are reported as
//! `unknown`. Capacity and identity fields (CPU count, RAM) pass through.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::constants::keys;
use crate::database::{CollectionOutcome, CollectionStatus, Database, HostRecord, HostStatus, VmRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Reachable,
    Unreachable,
    /// Never polled
    Unknown,
}

impl Reachability {
    pub fn from_status(status: Option<&CollectionStatus>) -> Self {
        match status.map(|s| &s.outcome) {
            Some(CollectionOutcome::Success) => Reachability::Reachable,
            Some(_) => Reachability::Unreachable,
            None => Reachability::Unknown,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, Reachability::Reachable)
    }
}

#[derive(Clone)]
pub struct ReachabilityTracker {
    database: Arc<Database>,
}

impl ReachabilityTracker {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Latest collection status; storage errors read as never polled
    pub async fn status(&self, host: &str) -> Option<CollectionStatus> {
        match self.database.get_collection_status(host).await {
            Ok(status) => status,
            Err(e) => {
                error!("Failed to read collection status for {}: {}", host, e);
                None
            }
        }
    }

    pub async fn reachability(&self, host: &str) -> Reachability {
        Reachability::from_status(self.status(host).await.as_ref())
    }

    pub async fn is_reachable(&self, host: &str) -> bool {
        self.reachability(host).await.is_reachable()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmView {
    pub esxi_host: String,
    pub vm_name: String,
    pub cpu_count: Option<i64>,
    pub ram_mb: Option<i64>,
    pub storage_gb: Option<f64>,
    /// `unknown` when the hypervisor is unreachable
    pub power_state: String,
    /// Last collected power state, kept for capacity calculations
    pub cached_power_state: Option<String>,
    pub cpu_usage_mhz: Option<i64>,
    pub memory_usage_mb: Option<i64>,
    pub collected_at: chrono::DateTime<chrono::Utc>,
}

impl VmView {
    pub fn new(record: VmRecord, reachable: bool) -> Self {
        let power_state = match (&record.power_state, reachable) {
            (Some(state), true) => state.clone(),
            _ => keys::UNKNOWN.to_string(),
        };

        Self {
            esxi_host: record.esxi_host,
            vm_name: record.vm_name,
            cpu_count: record.cpu_count,
            ram_mb: record.ram_mb,
            storage_gb: record.storage_gb,
            power_state,
            cached_power_state: record.power_state,
            cpu_usage_mhz: record.cpu_usage_mhz,
            memory_usage_mb: record.memory_usage_mb,
            collected_at: record.collected_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostView {
    #[serde(flatten)]
    pub record: HostRecord,
    pub reachability: Reachability,
    pub collection_status: Option<CollectionStatus>,
}

impl HostView {
    pub fn new(mut record: HostRecord, status: Option<CollectionStatus>) -> Self {
        let reachability = Reachability::from_status(status.as_ref());
        if !reachability.is_reachable() {
            record.status = HostStatus::Unknown;
        }

        Self {
            record,
            reachability,
            collection_status: status,
        }
    }
}
