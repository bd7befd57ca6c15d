//! Families backed by the metrics server: uptime/usage, ZFS pools, mounts.
//! All of them are skipped when no metrics server is configured.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::Collector;
use crate::config::{Config, MachineConfig, PrometheusConfig};
use crate::database::{CollectionOutcome, HostRecord, MountRecord, ZfsPoolRecord};
use crate::sources::MetricsSource;

impl Collector {
    fn metrics_backend<'a>(
        &'a self,
        config: &'a Config,
    ) -> Option<(&'a Arc<dyn MetricsSource>, &'a PrometheusConfig)> {
        match (&self.sources.metrics, &config.prometheus) {
            (Some(source), Some(prometheus)) => Some((source, prometheus)),
            _ => None,
        }
    }

    pub(super) async fn collect_metrics_hosts(&self, config: &Config) -> bool {
        let Some((metrics, prometheus)) = self.metrics_backend(config) else {
            return false;
        };

        let mut changed = false;
        for machine in config.machines.iter().filter(|m| m.uses_metrics_server()) {
            changed |= self.collect_metrics_host(metrics.as_ref(), prometheus, machine).await;
        }
        changed
    }

    async fn collect_metrics_host(
        &self,
        metrics: &dyn MetricsSource,
        prometheus: &PrometheusConfig,
        machine: &MachineConfig,
    ) -> bool {
        let host = machine.name.as_str();
        let instance = prometheus.instance_for(host);
        let is_windows = machine.is_windows();
        info!(
            "Collecting uptime and usage from metrics server for {} (instance: {}, windows: {})...",
            host, instance, is_windows
        );

        let Some(uptime) = metrics.uptime(&instance, is_windows).await else {
            let before = self.previous_outcome(host).await;
            self.mark_failed(host, CollectionOutcome::NoData).await;
            return before != Some(CollectionOutcome::NoData);
        };
        let usage = metrics.usage(&instance, is_windows).await.unwrap_or_default();

        let record = HostRecord {
            boot_time: uptime.boot_time,
            uptime_seconds: Some(uptime.uptime_seconds),
            cpu_usage_percent: usage.cpu_usage_percent,
            memory_usage_percent: usage.memory_usage_percent,
            memory_total_bytes: usage.memory_total_bytes,
            memory_used_bytes: usage.memory_used_bytes,
            ..HostRecord::running(host)
        };

        match self.database.upsert_host(&record).await {
            Ok(()) => info!(
                "  Cached uptime for {}: {:.1} days",
                host,
                uptime.uptime_seconds / 86400.0
            ),
            Err(e) => error!("Failed to store host info for {}: {}", host, e),
        }
        self.set_outcome(host, CollectionOutcome::Success).await;
        true
    }

    pub(super) async fn collect_zfs(&self, config: &Config) -> bool {
        let Some((metrics, prometheus)) = self.metrics_backend(config) else {
            return false;
        };

        let mut changed = false;
        for machine in config.machines.iter().filter(|m| m.has_zfs()) {
            let instance = prometheus.instance_for(&machine.name);
            let samples = metrics.zfs_pools(&instance).await;
            if samples.is_empty() {
                debug!("No ZFS pools reported for {}", machine.name);
                continue;
            }

            let now = Utc::now();
            let pools: Vec<ZfsPoolRecord> = samples
                .into_iter()
                .map(|sample| ZfsPoolRecord {
                    host: machine.name.clone(),
                    pool_name: sample.pool_name,
                    size_bytes: sample.size_bytes,
                    allocated_bytes: sample.allocated_bytes,
                    free_bytes: sample.free_bytes,
                    health: sample.health,
                    collected_at: now,
                })
                .collect();

            match self.database.replace_zfs_pools_for_host(&machine.name, &pools).await {
                Ok(()) => {
                    info!("  Cached {} ZFS pools for {}", pools.len(), machine.name);
                    changed = true;
                }
                Err(e) => error!("Failed to store ZFS pools for {}: {}", machine.name, e),
            }
        }
        changed
    }

    pub(super) async fn collect_mounts(&self, config: &Config) -> bool {
        let Some((metrics, prometheus)) = self.metrics_backend(config) else {
            return false;
        };

        let mut changed = false;
        for machine in config.machines.iter().filter(|m| !m.mount.is_empty()) {
            let instance = prometheus.instance_for(&machine.name);
            let is_windows = machine.is_windows();
            let mut mounts = Vec::new();

            for mount in &machine.mount {
                let mount_type = mount.effective_type(is_windows);
                let Some(sample) = metrics.mount(mount, mount_type, &instance).await else {
                    debug!("No data for mount {} on {}", mount.label, machine.name);
                    continue;
                };
                mounts.push(MountRecord {
                    host: machine.name.clone(),
                    mountpoint: mount.display_path().to_string(),
                    size_bytes: Some(sample.size_bytes),
                    avail_bytes: Some(sample.avail_bytes),
                    used_bytes: Some(sample.used_bytes),
                    collected_at: Utc::now(),
                });
            }

            if mounts.is_empty() {
                continue;
            }

            match self.database.replace_mounts_for_host(&machine.name, &mounts).await {
                Ok(()) => {
                    info!("  Cached {} mounts for {}", mounts.len(), machine.name);
                    changed = true;
                }
                Err(e) => error!("Failed to store mounts for {}: {}", machine.name, e),
            }
        }
        changed
    }
}
