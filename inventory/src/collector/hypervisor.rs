use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::{failure_outcome, Collector};
use crate::config::{Config, Credentials};
use crate::database::{CollectionOutcome, HostRecord, HostStatus, VmRecord};
use crate::errors::SourceError;
use crate::sources::{HostSnapshot, VmSnapshot};

pub(super) fn host_record(host: &str, snapshot: HostSnapshot, now: DateTime<Utc>) -> HostRecord {
    HostRecord {
        host: host.to_string(),
        boot_time: snapshot.boot_time,
        uptime_seconds: snapshot.uptime_seconds,
        status: HostStatus::Running,
        cpu_threads: snapshot.cpu_threads,
        cpu_cores: snapshot.cpu_cores,
        os_version: snapshot.os_version,
        cpu_usage_percent: snapshot.cpu_usage_percent,
        memory_usage_percent: snapshot.memory_usage_percent,
        memory_total_bytes: snapshot.memory_total_bytes,
        memory_used_bytes: snapshot.memory_used_bytes,
        collected_at: now,
    }
}

/// VMs without a name cannot be keyed and are dropped
pub(super) fn vm_records(host: &str, vms: Vec<VmSnapshot>, now: DateTime<Utc>) -> Vec<VmRecord> {
    vms.into_iter()
        .filter_map(|vm| {
            if vm.name.trim().is_empty() {
                warn!("Skipping unnamed VM reported by {}", host);
                return None;
            }
            Some(VmRecord {
                esxi_host: host.to_string(),
                vm_name: vm.name,
                cpu_count: vm.cpu_count,
                ram_mb: vm.ram_mb,
                storage_gb: vm.storage_gb,
                power_state: vm.power_state,
                cpu_usage_mhz: vm.cpu_usage_mhz,
                memory_usage_mb: vm.memory_usage_mb,
                collected_at: now,
            })
        })
        .collect()
}

impl Collector {
    pub(super) async fn collect_hypervisors(&self, config: &Config) -> bool {
        let mut changed = false;

        for (host, credentials) in &config.secrets.esxi {
            info!("Collecting data from {}...", host);
            let before = self.previous_outcome(host).await;

            match self.collect_hypervisor(host, credentials).await {
                Ok(()) => changed = true,
                Err(e) => changed |= before != Some(failure_outcome(&e)),
            }
        }

        changed
    }

    /// Poll one hypervisor and store the result. On failure the degraded
    /// host row and the failed outcome are written before returning.
    pub(super) async fn collect_hypervisor(
        &self,
        host: &str,
        credentials: &Credentials,
    ) -> Result<(), SourceError> {
        let snapshot = match self.sources.hypervisor.fetch(host, credentials).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Error collecting data from {}: {}", host, e);
                self.mark_failed(host, failure_outcome(&e)).await;
                return Err(e);
            }
        };

        let now = Utc::now();
        let vms = vm_records(host, snapshot.vms, now);
        match self.database.replace_vms_for_host(host, &vms).await {
            Ok(()) => info!("  Cached {} VMs from {}", vms.len(), host),
            Err(e) => error!("Failed to store VMs for {}: {}", host, e),
        }

        let record = host_record(host, snapshot.host, now);
        match self.database.upsert_host(&record).await {
            Ok(()) => info!(
                "  Cached host info for {} (CPU threads: {:?})",
                host, record.cpu_threads
            ),
            Err(e) => error!("Failed to store host info for {}: {}", host, e),
        }

        self.set_outcome(host, CollectionOutcome::Success).await;
        Ok(())
    }
}
