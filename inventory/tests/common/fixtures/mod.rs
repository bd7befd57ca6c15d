//! This module provides reusable test utilities:
//! - In-process fake source adapters
//! - Mock HTTP servers (metrics server, power controller, hypervisor, benchmark site)
//! - A fake NUT daemon on a local TCP port
//! - Test configuration builders
//! - In-memory test databases
//! - Common test data

// Allow unused code in test fixtures - each test binary uses a subset
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fake_nut;
pub mod fake_sources;
pub mod harness;
pub mod mock_benchmark;
pub mod mock_prometheus;
pub mod mock_redfish;
pub mod mock_vsphere;
pub mod test_config;
pub mod test_data;
pub mod test_database;

// Re-export commonly used items
pub use fake_nut::FakeNutServer;
pub use fake_sources::{FakeBenchmarkSource, FakeHypervisor, FakeMetrics, FakePower, FakeUps};
pub use harness::TestHarness;
pub use mock_benchmark::MockBenchmarkSite;
pub use mock_prometheus::MockPrometheusServer;
pub use mock_redfish::MockRedfishServer;
pub use mock_vsphere::MockVsphereServer;
pub use test_config::{TestConfig, TestConfigBuilder};
pub use test_data::*;
pub use test_database::TestDatabase;
