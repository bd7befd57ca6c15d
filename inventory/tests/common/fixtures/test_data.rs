//! Common records and snapshots used across the integration tests

use chrono::{TimeZone, Utc};

use inventory::database::{BenchmarkRecord, PowerRecord, VmRecord};
use inventory::sources::{
    HostSnapshot, HypervisorSnapshot, PoolSample, PowerReading, StorageSample, UpsSnapshot,
    UpsVariables, UptimeSample, UsageSample, VmSnapshot,
};

pub const ESXI_HOST: &str = "esxi-1.lab.local";
pub const OTHER_ESXI_HOST: &str = "esxi-2.lab.local";
pub const METRICS_HOST: &str = "tanzania.lab.local";
pub const METRICS_INSTANCE: &str = "tanzania";

pub fn vm_snapshot(name: &str, power_state: &str) -> VmSnapshot {
    VmSnapshot {
        name: name.to_string(),
        cpu_count: Some(4),
        ram_mb: Some(8192),
        storage_gb: Some(120.0),
        power_state: Some(power_state.to_string()),
        cpu_usage_mhz: None,
        memory_usage_mb: None,
    }
}

pub fn hypervisor_snapshot(vms: &[(&str, &str)]) -> HypervisorSnapshot {
    HypervisorSnapshot {
        host: HostSnapshot {
            boot_time: Some(Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap()),
            uptime_seconds: Some(86_400.0 * 30.0),
            cpu_threads: Some(32),
            cpu_cores: Some(16),
            os_version: Some("VMware ESXi 8.0.2".to_string()),
            ..Default::default()
        },
        vms: vms
            .iter()
            .map(|(name, state)| vm_snapshot(name, state))
            .collect(),
    }
}

pub fn vm_record(esxi_host: &str, name: &str, power_state: &str) -> VmRecord {
    VmRecord {
        esxi_host: esxi_host.to_string(),
        vm_name: name.to_string(),
        cpu_count: Some(2),
        ram_mb: Some(4096),
        storage_gb: Some(40.0),
        power_state: Some(power_state.to_string()),
        cpu_usage_mhz: None,
        memory_usage_mb: None,
        collected_at: Utc::now(),
    }
}

pub fn power_reading(watts: f64) -> PowerReading {
    PowerReading {
        power_watts: Some(watts),
        power_average_watts: Some(watts - 10.0),
        power_max_watts: Some(watts + 50.0),
        power_min_watts: Some(watts - 40.0),
    }
}

pub fn power_record(host: &str, watts: f64) -> PowerRecord {
    PowerRecord {
        host: host.to_string(),
        power_watts: Some(watts),
        power_average_watts: None,
        power_max_watts: None,
        power_min_watts: None,
        collected_at: Utc::now(),
    }
}

pub fn uptime_sample(uptime_seconds: f64) -> UptimeSample {
    UptimeSample {
        boot_time: Some(Utc::now() - chrono::Duration::seconds(uptime_seconds as i64)),
        uptime_seconds,
    }
}

pub fn usage_sample() -> UsageSample {
    UsageSample {
        cpu_usage_percent: Some(12.5),
        memory_usage_percent: Some(50.0),
        memory_total_bytes: Some(32.0 * 1024f64.powi(3)),
        memory_used_bytes: Some(16.0 * 1024f64.powi(3)),
    }
}

pub fn pool_sample(name: &str) -> PoolSample {
    PoolSample {
        pool_name: name.to_string(),
        size_bytes: Some(4.0e12),
        allocated_bytes: Some(1.0e12),
        free_bytes: Some(3.0e12),
        health: Some(0.0),
    }
}

pub fn storage_sample(size_bytes: f64, avail_bytes: f64) -> StorageSample {
    StorageSample {
        size_bytes,
        avail_bytes,
        used_bytes: size_bytes - avail_bytes,
    }
}

pub fn ups_snapshot(name: &str, clients: &[&str]) -> UpsSnapshot {
    UpsSnapshot {
        ups_name: name.to_string(),
        description: "Rack UPS".to_string(),
        variables: Some(UpsVariables {
            model: Some("Smart-UPS 1500".to_string()),
            battery_charge: Some(100.0),
            battery_runtime: Some(1800),
            ups_load: Some(21.0),
            ups_status: Some("OL".to_string()),
            ..Default::default()
        }),
        clients: clients.iter().map(|c| c.to_string()).collect(),
    }
}

pub fn benchmark(name: &str, multi: i64, single: i64) -> BenchmarkRecord {
    BenchmarkRecord {
        cpu_name: name.to_string(),
        multi_thread_score: Some(multi),
        single_thread_score: Some(single),
    }
}

/// Machine file for a hypervisor host
pub fn esxi_machine(name: &str) -> String {
    format!(
        "[machine]\nname = \"{}\"\nos = \"ESXi 8\"\ncpu = \"Intel Xeon E5-2699 v4\"\nesxi = \"{}\"\n\n[[machine.vm]]\nname = \"placeholder\"\n",
        name, name
    )
}

/// Machine file for a host covered by the metrics server
pub fn linux_machine(name: &str) -> String {
    format!(
        "[machine]\nname = \"{}\"\nos = \"Debian 12\"\ncpu = \"AMD Ryzen 9 5900X\"\nfilesystem = [\"zfs\"]\n\n[[machine.mount]]\nlabel = \"{}\"\npath = \"/srv\"\n",
        name,
        name.split('.').next().unwrap_or(name)
    )
}
