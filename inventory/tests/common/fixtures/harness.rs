//! Wires a collector and the read service to in-process fakes

use std::sync::Arc;

use inventory::collector::{Collector, Sources};
use inventory::config::ConfigManager;
use inventory::database::Database;
use inventory::events::EventNotifier;
use inventory::services::InventoryService;

use super::fake_sources::{FakeHypervisor, FakeMetrics, FakePower, FakeUps};
use super::test_config::TestConfig;
use super::test_database::TestDatabase;

pub struct TestHarness {
    pub config: TestConfig,
    pub config_manager: Arc<ConfigManager>,
    pub database: Arc<Database>,
    pub notifier: EventNotifier,
    pub hypervisor: Arc<FakeHypervisor>,
    pub power: Arc<FakePower>,
    pub metrics: Arc<FakeMetrics>,
    pub ups: Arc<FakeUps>,
    pub collector: Arc<Collector>,
}

impl TestHarness {
    pub async fn new(config: TestConfig) -> Self {
        let config_manager = config.manager().await;
        let database = TestDatabase::new().await;
        let notifier = EventNotifier::new();

        let hypervisor = FakeHypervisor::new();
        let power = FakePower::new();
        let metrics = FakeMetrics::new();
        let ups = FakeUps::new();

        let sources = Sources {
            hypervisor: hypervisor.clone(),
            power: power.clone(),
            metrics: Some(metrics.clone()),
            ups: ups.clone(),
        };

        let collector = Arc::new(Collector::new(
            config_manager.clone(),
            database.clone(),
            sources,
            notifier.clone(),
        ));

        Self {
            config,
            config_manager,
            database,
            notifier,
            hypervisor,
            power,
            metrics,
            ups,
            collector,
        }
    }

    pub fn inventory(&self) -> Arc<InventoryService> {
        Arc::new(InventoryService::new(
            self.database.clone(),
            self.config_manager.clone(),
            self.collector.clone(),
        ))
    }
}
