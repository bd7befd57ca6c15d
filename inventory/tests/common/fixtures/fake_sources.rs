//! In-process source adapters for driving the collector and the benchmark
//! resolver without any network

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use inventory::config::{Credentials, MountConfig, MountType, UpsTarget};
use inventory::database::BenchmarkRecord;
use inventory::errors::SourceError;
use inventory::sources::{
    BenchmarkSource, HypervisorSnapshot, HypervisorSource, MetricsSource, PoolSample,
    PowerReading, PowerSource, StorageSample, UpsSnapshot, UpsSource, UptimeSample, UsageSample,
};

fn unreachable(target: &str) -> SourceError {
    SourceError::ConnectionFailed {
        target: target.to_string(),
        reason: "connection refused".to_string(),
    }
}

// ============================================================================
// Hypervisor
// ============================================================================

/// Hosts without a programmed response are unreachable
#[derive(Default)]
pub struct FakeHypervisor {
    responses: Mutex<HashMap<String, Result<HypervisorSnapshot, SourceError>>>,
    calls: AtomicUsize,
}

impl FakeHypervisor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_snapshot(&self, host: &str, snapshot: HypervisorSnapshot) {
        self.responses
            .lock()
            .unwrap()
            .insert(host.to_string(), Ok(snapshot));
    }

    pub fn set_error(&self, host: &str, error: SourceError) {
        self.responses
            .lock()
            .unwrap()
            .insert(host.to_string(), Err(error));
    }

    pub fn set_unreachable(&self, host: &str) {
        self.set_error(host, unreachable(host));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HypervisorSource for FakeHypervisor {
    async fn fetch(
        &self,
        host: &str,
        _credentials: &Credentials,
    ) -> Result<HypervisorSnapshot, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(host)
            .cloned()
            .unwrap_or_else(|| Err(unreachable(host)))
    }
}

// ============================================================================
// Power controller
// ============================================================================

#[derive(Default)]
pub struct FakePower {
    responses: Mutex<HashMap<String, Result<PowerReading, SourceError>>>,
}

impl FakePower {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_reading(&self, host: &str, reading: PowerReading) {
        self.responses
            .lock()
            .unwrap()
            .insert(host.to_string(), Ok(reading));
    }

    pub fn set_unreachable(&self, host: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(host.to_string(), Err(unreachable(host)));
    }
}

#[async_trait]
impl PowerSource for FakePower {
    async fn fetch_power(
        &self,
        host: &str,
        _credentials: &Credentials,
    ) -> Result<PowerReading, SourceError> {
        self.responses
            .lock()
            .unwrap()
            .get(host)
            .cloned()
            .unwrap_or_else(|| Err(unreachable(host)))
    }
}

// ============================================================================
// Metrics server
// ============================================================================

/// Keyed by instance label; mounts by (instance, mount label)
#[derive(Default)]
pub struct FakeMetrics {
    uptime: Mutex<HashMap<String, UptimeSample>>,
    usage: Mutex<HashMap<String, UsageSample>>,
    pools: Mutex<HashMap<String, Vec<PoolSample>>>,
    mounts: Mutex<HashMap<(String, String), StorageSample>>,
    mount_types: Mutex<Vec<(String, MountType)>>,
}

impl FakeMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_uptime(&self, instance: &str, sample: UptimeSample) {
        self.uptime
            .lock()
            .unwrap()
            .insert(instance.to_string(), sample);
    }

    pub fn clear_uptime(&self, instance: &str) {
        self.uptime.lock().unwrap().remove(instance);
    }

    pub fn set_usage(&self, instance: &str, sample: UsageSample) {
        self.usage
            .lock()
            .unwrap()
            .insert(instance.to_string(), sample);
    }

    pub fn set_pools(&self, instance: &str, pools: Vec<PoolSample>) {
        self.pools
            .lock()
            .unwrap()
            .insert(instance.to_string(), pools);
    }

    pub fn set_mount(&self, instance: &str, label: &str, sample: StorageSample) {
        self.mounts
            .lock()
            .unwrap()
            .insert((instance.to_string(), label.to_string()), sample);
    }

    /// Mount labels queried so far with the type they were queried as
    pub fn mount_types(&self) -> Vec<(String, MountType)> {
        self.mount_types.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricsSource for FakeMetrics {
    async fn uptime(&self, instance: &str, _is_windows: bool) -> Option<UptimeSample> {
        self.uptime.lock().unwrap().get(instance).cloned()
    }

    async fn usage(&self, instance: &str, _is_windows: bool) -> Option<UsageSample> {
        self.usage.lock().unwrap().get(instance).cloned()
    }

    async fn zfs_pools(&self, instance: &str) -> Vec<PoolSample> {
        self.pools
            .lock()
            .unwrap()
            .get(instance)
            .cloned()
            .unwrap_or_default()
    }

    async fn mount(
        &self,
        mount: &MountConfig,
        mount_type: MountType,
        instance: &str,
    ) -> Option<StorageSample> {
        self.mount_types
            .lock()
            .unwrap()
            .push((mount.label.clone(), mount_type));
        self.mounts
            .lock()
            .unwrap()
            .get(&(instance.to_string(), mount.label.clone()))
            .cloned()
    }
}

// ============================================================================
// UPS daemon
// ============================================================================

#[derive(Default)]
pub struct FakeUps {
    responses: Mutex<HashMap<String, Result<Vec<UpsSnapshot>, SourceError>>>,
}

impl FakeUps {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_devices(&self, host: &str, devices: Vec<UpsSnapshot>) {
        self.responses
            .lock()
            .unwrap()
            .insert(host.to_string(), Ok(devices));
    }
}

#[async_trait]
impl UpsSource for FakeUps {
    async fn fetch_all(&self, target: &UpsTarget) -> Result<Vec<UpsSnapshot>, SourceError> {
        self.responses
            .lock()
            .unwrap()
            .get(&target.host)
            .cloned()
            .unwrap_or_else(|| Err(unreachable(&target.host)))
    }
}

// ============================================================================
// Benchmark site
// ============================================================================

/// Answers from a fixed table. With a gate, every search waits for a permit
/// so tests can hold a fetch in flight.
pub struct FakeBenchmarkSource {
    records: Mutex<HashMap<String, BenchmarkRecord>>,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl FakeBenchmarkSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        })
    }

    pub fn gated(gate: Arc<Semaphore>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            gate: Some(gate),
        })
    }

    /// Answer `query` with `record`
    pub fn set_result(&self, query: &str, record: BenchmarkRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(query.to_string(), record);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BenchmarkSource for FakeBenchmarkSource {
    async fn search(&self, cpu_name: &str) -> Option<BenchmarkRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.ok()?;
            permit.forget();
        }
        self.records.lock().unwrap().get(cpu_name).cloned()
    }
}
