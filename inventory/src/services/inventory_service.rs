// File: inventory/src/services/inventory_service.rs
//! Read side of the inventory.
//!
//! Every read answers from the local store and never waits on an upstream.
//! Storage errors are logged and read as "no data". Host and VM reads go
//! through the reachability views so current-state fields degrade to
//! `unknown` for hosts whose last poll failed.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, warn};

use crate::cache_refresher::config_blob;
use crate::collector::Collector;
use crate::config::ConfigManager;
use crate::constants::keys;
use crate::database::{
    CollectionStatus, Database, MountRecord, PowerRecord, UpsClientRecord, UpsRecord, VmRecord,
    ZfsPoolRecord,
};
use crate::errors::InventoryError;
use crate::reachability::{HostView, Reachability, ReachabilityTracker, VmView};

/// A UPS together with the machines it powers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpsView {
    #[serde(flatten)]
    pub ups: UpsRecord,
    pub clients: Vec<UpsClientRecord>,
}

pub struct InventoryService {
    database: Arc<Database>,
    config_manager: Arc<ConfigManager>,
    collector: Arc<Collector>,
    reachability: ReachabilityTracker,
}

/// Log a storage error and fall back to the given value
fn or_log<T>(result: anyhow::Result<T>, what: &str, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to read {}: {}", what, e);
            fallback
        }
    }
}

impl InventoryService {
    pub fn new(
        database: Arc<Database>,
        config_manager: Arc<ConfigManager>,
        collector: Arc<Collector>,
    ) -> Self {
        Self {
            reachability: ReachabilityTracker::new(database.clone()),
            database,
            config_manager,
            collector,
        }
    }

    pub fn reachability(&self) -> &ReachabilityTracker {
        &self.reachability
    }

    // ------------------------------------------------------------------------
    // Hosts and VMs
    // ------------------------------------------------------------------------

    pub async fn get_host(&self, host: &str) -> Option<HostView> {
        let record = or_log(self.database.get_host(host).await, "host info", None)?;
        let status = self.reachability.status(host).await;
        Some(HostView::new(record, status))
    }

    pub async fn get_all_hosts(&self) -> Vec<HostView> {
        let records = or_log(self.database.get_all_hosts().await, "host info", Vec::new());
        let mut statuses: HashMap<String, CollectionStatus> = self
            .collection_status()
            .await
            .into_iter()
            .map(|status| (status.host.clone(), status))
            .collect();

        records
            .into_iter()
            .map(|record| {
                let status = statuses.remove(&record.host);
                HostView::new(record, status)
            })
            .collect()
    }

    pub async fn get_vms_for_host(&self, esxi_host: &str) -> Vec<VmView> {
        let records = or_log(
            self.database.get_vms_for_host(esxi_host).await,
            "VM info",
            Vec::new(),
        );
        let reachable = self.reachability.is_reachable(esxi_host).await;
        records
            .into_iter()
            .map(|record| VmView::new(record, reachable))
            .collect()
    }

    pub async fn get_vm_info(&self, vm_name: &str, esxi_host: Option<&str>) -> Option<VmView> {
        let record = or_log(
            self.database.get_vm(vm_name, esxi_host).await,
            "VM info",
            None,
        )?;
        let reachable = self.reachability.is_reachable(&record.esxi_host).await;
        Some(VmView::new(record, reachable))
    }

    pub async fn collection_status(&self) -> Vec<CollectionStatus> {
        or_log(
            self.database.get_all_collection_status().await,
            "collection status",
            Vec::new(),
        )
    }

    /// Run one synchronous collection for a single hypervisor
    pub async fn refresh_now(&self, host: &str) -> Result<(), InventoryError> {
        self.collector.refresh_now(host).await
    }

    // ------------------------------------------------------------------------
    // Power and storage
    // ------------------------------------------------------------------------

    pub async fn get_power(&self, host: &str) -> Option<PowerRecord> {
        or_log(self.database.get_power(host).await, "power info", None)
    }

    pub async fn get_all_power(&self) -> Vec<PowerRecord> {
        or_log(self.database.get_all_power().await, "power info", Vec::new())
    }

    pub async fn get_zfs(&self, host: &str) -> Vec<ZfsPoolRecord> {
        or_log(self.database.get_zfs_pools(host).await, "ZFS pools", Vec::new())
    }

    pub async fn get_mounts(&self, host: &str) -> Vec<MountRecord> {
        or_log(self.database.get_mounts(host).await, "mount info", Vec::new())
    }

    // ------------------------------------------------------------------------
    // UPS
    // ------------------------------------------------------------------------

    pub async fn get_ups(&self, ups_name: &str, host: &str) -> Option<UpsView> {
        let ups = or_log(self.database.get_ups(ups_name, host).await, "UPS info", None)?;
        let clients = or_log(
            self.database.get_ups_clients(ups_name, host).await,
            "UPS clients",
            Vec::new(),
        );
        Some(UpsView { ups, clients })
    }

    /// Every UPS with its clients
    pub async fn get_all_ups(&self) -> Vec<UpsView> {
        let records = or_log(self.database.get_all_ups().await, "UPS info", Vec::new());
        let mut topology = Vec::with_capacity(records.len());

        for ups in records {
            let clients = or_log(
                self.database.get_ups_clients(&ups.ups_name, &ups.host).await,
                "UPS clients",
                Vec::new(),
            );
            topology.push(UpsView { ups, clients });
        }
        topology
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Cached configuration, falling back to the loaded files. VM lists of
    /// hypervisor machines are replaced with the collected ones.
    pub async fn get_config(&self) -> Option<Value> {
        let cached = or_log(
            self.database.get_cache(keys::CONFIG_CACHE_KEY).await,
            "config cache",
            None,
        );

        let mut blob = match cached {
            Some(entry) => entry.value,
            None => {
                let config = self.config_manager.get_current_config().await;
                match config_blob(&config) {
                    Ok(blob) => blob,
                    Err(e) => {
                        warn!("Failed to serialize configuration: {}", e);
                        return None;
                    }
                }
            }
        };

        self.enrich_with_vms(&mut blob).await;
        Some(blob)
    }

    async fn enrich_with_vms(&self, blob: &mut Value) {
        let Some(machines) = blob.get_mut("machine").and_then(Value::as_array_mut) else {
            return;
        };

        let mut vms_by_host: HashMap<String, Vec<VmRecord>> = HashMap::new();
        for vm in or_log(self.database.get_all_vms().await, "VM info", Vec::new()) {
            vms_by_host.entry(vm.esxi_host.clone()).or_default().push(vm);
        }
        let statuses: HashMap<String, CollectionStatus> = self
            .collection_status()
            .await
            .into_iter()
            .map(|status| (status.host.clone(), status))
            .collect();

        for machine in machines.iter_mut() {
            if !is_hypervisor_machine(machine) {
                continue;
            }
            let Some(name) = machine.get("name").and_then(Value::as_str) else {
                continue;
            };
            let Some(vms) = vms_by_host.remove(name) else {
                continue;
            };

            let reachable = Reachability::from_status(statuses.get(name)).is_reachable();
            let vm_list: Vec<Value> = vms
                .into_iter()
                .map(|vm| {
                    let view = VmView::new(vm, reachable);
                    json!({ "name": view.vm_name, "power_state": view.power_state })
                })
                .collect();
            machine["vm"] = Value::Array(vm_list);
        }
    }
}

fn is_hypervisor_machine(machine: &Value) -> bool {
    machine
        .get("os")
        .and_then(Value::as_str)
        .map(|os| os.to_lowercase().contains("esxi"))
        .unwrap_or(false)
}
