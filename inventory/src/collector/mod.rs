// File: inventory/src/collector/mod.rs
//! Periodic collection across every configured source family.
//!
//! One pass (`collect_all`) walks the hypervisors, power controllers,
//! metrics-server hosts and UPS daemons in turn. Targets are independent:
//! a failure is recorded for that target and the pass moves on. Listeners
//! get at most one `Data` event per pass.

mod hypervisor;
mod metrics;
mod power;
mod ups;

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::ConfigManager;
use crate::database::{CollectionOutcome, CollectionStatus, Database, HostRecord};
use crate::errors::{ConfigError, InventoryError, SourceError};
use crate::events::{EventNotifier, EventType};
use crate::scheduler::Job;
use crate::sources::{HypervisorSource, MetricsSource, PowerSource, UpsSource};

/// Adapter set the collector polls
#[derive(Clone)]
pub struct Sources {
    pub hypervisor: Arc<dyn HypervisorSource>,
    pub power: Arc<dyn PowerSource>,
    /// Absent when no metrics server is configured
    pub metrics: Option<Arc<dyn MetricsSource>>,
    pub ups: Arc<dyn UpsSource>,
}

pub struct Collector {
    config_manager: Arc<ConfigManager>,
    database: Arc<Database>,
    sources: Sources,
    notifier: EventNotifier,
}

impl Collector {
    pub fn new(
        config_manager: Arc<ConfigManager>,
        database: Arc<Database>,
        sources: Sources,
        notifier: EventNotifier,
    ) -> Self {
        Self {
            config_manager,
            database,
            sources,
            notifier,
        }
    }

    /// Run every family once. Returns true when a `Data` event was sent.
    pub async fn collect_all(&self) -> bool {
        let config = self.config_manager.get_current_config().await;
        let mut changed = false;

        changed |= self.collect_hypervisors(&config).await;
        changed |= self.collect_power(&config).await;
        changed |= self.collect_metrics_hosts(&config).await;
        changed |= self.collect_zfs(&config).await;
        changed |= self.collect_mounts(&config).await;
        changed |= self.collect_ups(&config).await;

        if changed {
            self.notifier.notify(EventType::Data);
            info!("Data collection complete, clients notified");
        } else {
            info!("Data collection complete, nothing changed");
        }
        changed
    }

    /// Collect one hypervisor right now. Listeners are notified whether or
    /// not the host answered.
    pub async fn refresh_now(&self, host: &str) -> Result<(), InventoryError> {
        let config = self.config_manager.get_current_config().await;
        let Some(credentials) = config.secrets.esxi.get(host) else {
            warn!("No credentials found for host: {}", host);
            return Err(ConfigError::MissingRequired {
                field: format!("esxi.{}", host),
            }
            .into());
        };

        info!("Collecting data from {} (manual refresh)...", host);
        let result = self.collect_hypervisor(host, credentials).await;
        self.notifier.notify(EventType::Data);
        result.map_err(InventoryError::from)
    }

    async fn previous_outcome(&self, host: &str) -> Option<CollectionOutcome> {
        match self.database.get_collection_status(host).await {
            Ok(status) => status.map(|s| s.outcome),
            Err(e) => {
                error!("Failed to read collection status for {}: {}", host, e);
                None
            }
        }
    }

    async fn set_outcome(&self, host: &str, outcome: CollectionOutcome) {
        let status = CollectionStatus {
            host: host.to_string(),
            last_fetch: Utc::now(),
            outcome,
        };
        if let Err(e) = self.database.upsert_collection_status(&status).await {
            error!("Failed to store collection status for {}: {}", host, e);
        }
    }

    /// Degraded host row plus the failed outcome
    async fn mark_failed(&self, host: &str, outcome: CollectionOutcome) {
        if let Err(e) = self.database.upsert_host(&HostRecord::degraded(host)).await {
            error!("Failed to store degraded host info for {}: {}", host, e);
        }
        self.set_outcome(host, outcome).await;
    }
}

/// Outcome recorded for a hypervisor that could not be collected
pub fn failure_outcome(err: &SourceError) -> CollectionOutcome {
    if err.is_unreachable() {
        CollectionOutcome::ConnectionFailed
    } else {
        CollectionOutcome::Error(err.to_string())
    }
}

#[async_trait]
impl Job for Collector {
    fn name(&self) -> &str {
        "collector"
    }

    async fn run_once(&self) {
        self.collect_all().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_outcome() {
        let unreachable = SourceError::ConnectionFailed {
            target: "esxi-1".to_string(),
            reason: "refused".to_string(),
        };
        assert_eq!(failure_outcome(&unreachable), CollectionOutcome::ConnectionFailed);

        let malformed = SourceError::InvalidResponse {
            target: "esxi-1".to_string(),
            reason: "bad json".to_string(),
        };
        assert!(matches!(failure_outcome(&malformed), CollectionOutcome::Error(_)));
    }
}
