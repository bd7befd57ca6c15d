// File: inventory/src/config/mod.rs
pub mod manager;
pub mod secrets;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use manager::ConfigManager;
pub use secrets::{Credentials, SecretsFile};

use crate::constants::{http, nut, schedule, web};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_collect_interval")]
    pub collect_interval_seconds: u64,
    #[serde(default = "default_cache_refresh_interval")]
    pub cache_refresh_interval_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
    pub prometheus: Option<PrometheusConfig>,
    #[serde(default)]
    pub ups: Vec<UpsTarget>,
    // Populated from individual machine files, sorted by name
    #[serde(skip)]
    pub machines: Vec<MachineConfig>,
    #[serde(skip)]
    pub secrets: SecretsFile,
}

fn default_host() -> String {
    web::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    web::DEFAULT_PORT
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_collect_interval() -> u64 {
    schedule::COLLECT_INTERVAL_SECONDS
}

fn default_cache_refresh_interval() -> u64 {
    schedule::CACHE_REFRESH_INTERVAL_SECONDS
}

fn default_request_timeout() -> u64 {
    http::REQUEST_TIMEOUT_SECONDS
}

fn default_shutdown_timeout() -> u64 {
    schedule::SHUTDOWN_TIMEOUT_SECONDS
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrometheusConfig {
    pub url: String,
    #[serde(default)]
    pub instance_map: BTreeMap<String, String>,
}

impl PrometheusConfig {
    /// Prometheus `instance` label for a host: explicit mapping first, then
    /// the first DNS label of the FQDN.
    pub fn instance_for(&self, host: &str) -> String {
        if let Some(instance) = self.instance_map.get(host) {
            return instance.clone();
        }
        match host.split_once('.') {
            Some((first, _)) => first.to_string(),
            None => host.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsTarget {
    pub host: String,
    #[serde(default = "default_nut_port")]
    pub port: u16,
    pub ups_name: Option<String>,
}

fn default_nut_port() -> u16 {
    nut::DEFAULT_PORT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfigFile {
    pub machine: MachineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(default)]
    pub name: String,
    pub mode: Option<String>,
    pub cpu: Option<String>,
    pub ram: Option<String>,
    pub os: Option<String>,
    #[serde(default)]
    pub storage: Vec<StorageConfig>,
    #[serde(default)]
    pub filesystem: Vec<String>,
    pub esxi: Option<String>,
    pub ilo: Option<String>,
    #[serde(default)]
    pub vm: Vec<VmConfig>,
    #[serde(default)]
    pub mount: Vec<MountConfig>,
}

impl MachineConfig {
    pub fn is_windows(&self) -> bool {
        self.os
            .as_deref()
            .map(|os| os.eq_ignore_ascii_case("windows"))
            .unwrap_or(false)
    }

    /// Hypervisor address, if set to something
    pub fn hypervisor(&self) -> Option<&str> {
        self.esxi.as_deref().filter(|esxi| !esxi.trim().is_empty())
    }

    /// Machines without a hypervisor are covered by the metrics server
    pub fn uses_metrics_server(&self) -> bool {
        self.hypervisor().is_none()
    }

    pub fn has_zfs(&self) -> bool {
        self.filesystem.iter().any(|fs| fs == "zfs")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub name: String,
    pub model: String,
    pub volume: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmConfig {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountType {
    Filesystem,
    Btrfs,
    Windows,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountConfig {
    pub label: String,
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub mount_type: Option<MountType>,
}

impl MountConfig {
    /// Display path, defaulting to the label
    pub fn display_path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.label)
    }

    /// Explicit type, else `windows` on Windows machines, else `filesystem`
    pub fn effective_type(&self, machine_is_windows: bool) -> MountType {
        match self.mount_type {
            Some(t) => t,
            None if machine_is_windows => MountType::Windows,
            None => MountType::Filesystem,
        }
    }
}

impl Config {
    pub fn machine(&self, name: &str) -> Option<&MachineConfig> {
        self.machines.iter().find(|m| m.name == name)
    }
}
