// File: inventory/src/sources/vsphere.rs
//! Hypervisor inventory over the vSphere Automation REST API.
//!
//! A collection opens a session, lists VMs, reads per-VM hardware detail for
//! disk capacity, reads host-level appliance data and closes the session.
//! Fields the REST API does not expose (thread counts, live usage) stay
//! absent.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{HostSnapshot, HypervisorSnapshot, HypervisorSource, VmSnapshot};
use crate::config::Credentials;
use crate::constants::http;
use crate::errors::{classify_reqwest_error, SourceError};

const SESSION_HEADER: &str = "vmware-api-session-id";
const DEFAULT_PORT: u16 = 443;

pub struct VsphereClient {
    client: Client,
    scheme: String,
}

/// Map API power states onto the names the inventory has always stored
pub fn normalize_power_state(state: &str) -> String {
    match state {
        "POWERED_ON" => "poweredOn".to_string(),
        "POWERED_OFF" => "poweredOff".to_string(),
        "SUSPENDED" => "suspended".to_string(),
        other => other.to_string(),
    }
}

/// Build one VM from its list entry and hardware detail.
/// Returns None when the entry has no usable name.
pub fn parse_vm(summary: &Value, detail: &Value) -> Option<VmSnapshot> {
    let name = detail["name"]
        .as_str()
        .or_else(|| summary["name"].as_str())
        .filter(|name| !name.is_empty())?
        .to_string();

    let cpu_count = detail["cpu"]["count"]
        .as_i64()
        .or_else(|| summary["cpu_count"].as_i64());
    let ram_mb = detail["memory"]["size_MiB"]
        .as_i64()
        .or_else(|| summary["memory_size_MiB"].as_i64());
    let power_state = detail["power_state"]
        .as_str()
        .or_else(|| summary["power_state"].as_str())
        .map(normalize_power_state);

    let storage_gb = detail["disks"].as_object().map(|disks| {
        let total_bytes: f64 = disks
            .values()
            .filter_map(|disk| disk["capacity"].as_f64())
            .sum();
        (total_bytes / 1024f64.powi(3) * 100.0).round() / 100.0
    });

    Some(VmSnapshot {
        name,
        cpu_count,
        ram_mb,
        storage_gb,
        power_state,
        cpu_usage_mhz: None,
        memory_usage_mb: None,
    })
}

impl VsphereClient {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            scheme: "https".to_string(),
        })
    }

    /// Plain-HTTP variant for local mock servers
    pub fn with_scheme(request_timeout: Duration, scheme: &str) -> Result<Self> {
        let mut vsphere = Self::new(request_timeout)?;
        vsphere.scheme = scheme.to_string();
        Ok(vsphere)
    }

    fn base_url(&self, address: &str, port: Option<u16>) -> String {
        format!(
            "{}://{}:{}",
            self.scheme,
            address,
            port.unwrap_or(DEFAULT_PORT)
        )
    }

    async fn login(
        &self,
        base_url: &str,
        address: &str,
        credentials: &Credentials,
    ) -> Result<String, SourceError> {
        let response = self
            .client
            .post(format!("{}/api/session", base_url))
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| classify_reqwest_error(address, "opening session", e))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(SourceError::ConnectionFailed {
                    target: address.to_string(),
                    reason: "authentication rejected".to_string(),
                });
            }
            status => {
                return Err(SourceError::ConnectionFailed {
                    target: address.to_string(),
                    reason: format!("session request returned HTTP {}", status),
                });
            }
        }

        let token: Value = response
            .json()
            .await
            .map_err(|e| classify_reqwest_error(address, "decoding session token", e))?;

        token
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SourceError::InvalidResponse {
                target: address.to_string(),
                reason: "session token is not a string".to_string(),
            })
    }

    async fn get_json(
        &self,
        url: &str,
        address: &str,
        session: &str,
        operation: &str,
    ) -> Result<Value, SourceError> {
        let response = self
            .client
            .get(url)
            .header(SESSION_HEADER, session)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(address, operation, e))?;

        if !response.status().is_success() {
            return Err(SourceError::InvalidResponse {
                target: address.to_string(),
                reason: format!("{} returned HTTP {}", operation, response.status()),
            });
        }

        response
            .json()
            .await
            .map_err(|e| classify_reqwest_error(address, operation, e))
    }

    async fn fetch_vms(
        &self,
        base_url: &str,
        address: &str,
        session: &str,
    ) -> Result<Vec<VmSnapshot>, SourceError> {
        let listing = self
            .get_json(&format!("{}/api/vcenter/vm", base_url), address, session, "listing VMs")
            .await?;

        let summaries = listing
            .as_array()
            .ok_or_else(|| SourceError::InvalidResponse {
                target: address.to_string(),
                reason: "VM listing is not an array".to_string(),
            })?;

        let mut vms = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let Some(vm_id) = summary["vm"].as_str() else {
                warn!("Skipping VM without identifier on {}", address);
                continue;
            };

            let detail_url = format!("{}/api/vcenter/vm/{}", base_url, vm_id);
            let detail = match self
                .get_json(&detail_url, address, session, "reading VM detail")
                .await
            {
                Ok(detail) => detail,
                Err(e) => {
                    warn!("Skipping VM {} on {}: {}", vm_id, address, e);
                    continue;
                }
            };

            match parse_vm(summary, &detail) {
                Some(vm) => vms.push(vm),
                None => warn!("Skipping malformed VM {} on {}", vm_id, address),
            }
        }

        Ok(vms)
    }

    async fn fetch_host(&self, base_url: &str, address: &str, session: &str) -> HostSnapshot {
        let mut host = HostSnapshot::default();

        match self
            .get_json(
                &format!("{}/api/appliance/system/version", base_url),
                address,
                session,
                "reading version",
            )
            .await
        {
            Ok(version) => {
                host.os_version = match (version["product"].as_str(), version["version"].as_str()) {
                    (Some(product), Some(version)) => Some(format!("{} {}", product, version)),
                    (None, Some(version)) => Some(version.to_string()),
                    _ => None,
                };
            }
            Err(e) => debug!("No version information from {}: {}", address, e),
        }

        match self
            .get_json(
                &format!("{}/api/appliance/system/uptime", base_url),
                address,
                session,
                "reading uptime",
            )
            .await
        {
            Ok(uptime) => {
                if let Some(seconds) = uptime.as_f64() {
                    host.uptime_seconds = Some(seconds);
                    host.boot_time =
                        Some(Utc::now() - ChronoDuration::milliseconds((seconds * 1000.0) as i64));
                }
            }
            Err(e) => debug!("No uptime information from {}: {}", address, e),
        }

        host
    }

    async fn logout(&self, base_url: &str, session: &str) {
        if let Err(e) = self
            .client
            .delete(format!("{}/api/session", base_url))
            .header(SESSION_HEADER, session)
            .send()
            .await
        {
            debug!("Failed to close session on {}: {}", base_url, e);
        }
    }
}

#[async_trait]
impl HypervisorSource for VsphereClient {
    async fn fetch(
        &self,
        host: &str,
        credentials: &Credentials,
    ) -> Result<HypervisorSnapshot, SourceError> {
        let address = credentials.address(host);
        let base_url = self.base_url(address, credentials.port);

        let session = self.login(&base_url, address, credentials).await?;
        debug!("Opened session on {}", address);

        let result = self.fetch_vms(&base_url, address, &session).await;
        let host_snapshot = if result.is_ok() {
            Some(self.fetch_host(&base_url, address, &session).await)
        } else {
            None
        };
        self.logout(&base_url, &session).await;

        let vms = result?;
        Ok(HypervisorSnapshot {
            host: host_snapshot.unwrap_or_default(),
            vms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_vm_with_disks() {
        let summary = json!({"vm": "vm-12", "name": "web", "power_state": "POWERED_ON", "cpu_count": 4, "memory_size_MiB": 8192});
        let detail = json!({
            "name": "web",
            "power_state": "POWERED_ON",
            "cpu": {"count": 4},
            "memory": {"size_MiB": 8192},
            "disks": {
                "2000": {"capacity": 53687091200u64},
                "2001": {"capacity": 10737418240u64}
            }
        });

        let vm = parse_vm(&summary, &detail).unwrap();
        assert_eq!(vm.name, "web");
        assert_eq!(vm.cpu_count, Some(4));
        assert_eq!(vm.ram_mb, Some(8192));
        assert_eq!(vm.storage_gb, Some(60.0));
        assert_eq!(vm.power_state.as_deref(), Some("poweredOn"));
    }

    #[test]
    fn test_parse_vm_without_name() {
        assert!(parse_vm(&json!({"vm": "vm-1"}), &json!({})).is_none());
    }

    #[test]
    fn test_normalize_power_state() {
        assert_eq!(normalize_power_state("POWERED_OFF"), "poweredOff");
        assert_eq!(normalize_power_state("SUSPENDED"), "suspended");
        assert_eq!(normalize_power_state("other"), "other");
    }
}
