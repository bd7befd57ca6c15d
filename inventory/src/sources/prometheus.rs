// File: inventory/src/sources/prometheus.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::{MetricsSource, PoolSample, StorageSample, UptimeSample, UsageSample};
use crate::config::{MountConfig, MountType};
use crate::constants::http;
use crate::errors::{classify_reqwest_error, SourceError};

/// Instant-query client for the metrics server (`/api/v1/query`)
pub struct PrometheusClient {
    client: Client,
    base_url: String,
}

/// Pull `(timestamp, value)` out of one instant-vector result
fn parse_sample(result: &Value) -> Option<(f64, f64)> {
    let timestamp = result["value"][0].as_f64()?;
    let value = result["value"][1].as_str()?.parse::<f64>().ok()?;
    Some((timestamp, value))
}

fn timestamp_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds.trunc() as i64, (seconds.fract() * 1e9) as u32)
}

impl PrometheusClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn query(&self, promql: &str) -> Result<Vec<Value>, SourceError> {
        let url = format!("{}/api/v1/query", self.base_url);
        debug!("Prometheus query: {}", promql);

        let response = self
            .client
            .get(&url)
            .query(&[("query", promql)])
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&self.base_url, "querying", e))?;

        if !response.status().is_success() {
            return Err(SourceError::InvalidResponse {
                target: self.base_url.clone(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| classify_reqwest_error(&self.base_url, "decoding query result", e))?;

        if json["status"].as_str() != Some("success") {
            return Err(SourceError::InvalidResponse {
                target: self.base_url.clone(),
                reason: format!("query status {}", json["status"]),
            });
        }

        Ok(json["data"]["result"].as_array().cloned().unwrap_or_default())
    }

    /// Every result of a query; failures are logged and read as empty
    async fn results(&self, promql: &str) -> Vec<Value> {
        match self.query(promql).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Prometheus query failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn first_sample(&self, promql: &str) -> Option<(f64, f64)> {
        self.results(promql).await.first().and_then(parse_sample)
    }

    async fn scalar(&self, promql: &str) -> Option<f64> {
        self.first_sample(promql).await.map(|(_, value)| value)
    }

    async fn size_and_avail(&self, size_query: &str, avail_query: &str) -> Option<StorageSample> {
        let size_bytes = self.scalar(size_query).await?;
        let avail_bytes = self.scalar(avail_query).await?;
        Some(StorageSample {
            size_bytes,
            avail_bytes,
            used_bytes: size_bytes - avail_bytes,
        })
    }

    async fn btrfs_uuid(&self, label: &str) -> Option<String> {
        let results = self
            .results(&format!("node_btrfs_info{{label=\"{}\"}}", label))
            .await;
        results
            .first()
            .and_then(|result| result["metric"]["uuid"].as_str())
            .map(str::to_string)
    }

    async fn btrfs_usage(&self, label: &str) -> Option<StorageSample> {
        let uuid = self.btrfs_uuid(label).await?;
        let size_bytes = self
            .scalar(&format!("sum(node_btrfs_device_size_bytes{{uuid=\"{}\"}})", uuid))
            .await?;
        let used_bytes = self
            .scalar(&format!("sum(node_btrfs_used_bytes{{uuid=\"{}\"}})", uuid))
            .await?;
        Some(StorageSample {
            size_bytes,
            avail_bytes: size_bytes - used_bytes,
            used_bytes,
        })
    }
}

#[async_trait]
impl MetricsSource for PrometheusClient {
    async fn uptime(&self, instance: &str, is_windows: bool) -> Option<UptimeSample> {
        let metric = if is_windows {
            "windows_system_system_up_time"
        } else {
            "node_boot_time_seconds"
        };
        let query = format!("{}{{instance=~\"{}.*\"}}", metric, instance);

        let Some((now, boot)) = self.first_sample(&query).await else {
            warn!("No uptime data for instance {}", instance);
            return None;
        };

        Some(UptimeSample {
            boot_time: timestamp_to_datetime(boot),
            uptime_seconds: now - boot,
        })
    }

    async fn usage(&self, instance: &str, is_windows: bool) -> Option<UsageSample> {
        let (cpu_metric, total_metric, avail_metric) = if is_windows {
            (
                "windows_cpu_time_total",
                "windows_cs_physical_memory_bytes",
                "windows_os_physical_memory_free_bytes",
            )
        } else {
            (
                "node_cpu_seconds_total",
                "node_memory_MemTotal_bytes",
                "node_memory_MemAvailable_bytes",
            )
        };

        let cpu_query = format!(
            "100 - (avg by (instance) (rate({}{{instance=~\"{}.*\",mode=\"idle\"}}[5m])) * 100)",
            cpu_metric, instance
        );
        let cpu_usage_percent = self.scalar(&cpu_query).await;
        let memory_total_bytes = self
            .scalar(&format!("{}{{instance=~\"{}.*\"}}", total_metric, instance))
            .await;
        let memory_avail_bytes = self
            .scalar(&format!("{}{{instance=~\"{}.*\"}}", avail_metric, instance))
            .await;

        let (memory_used_bytes, memory_usage_percent) = match (memory_total_bytes, memory_avail_bytes) {
            (Some(total), Some(avail)) if total > 0.0 => {
                let used = total - avail;
                (Some(used), Some(used / total * 100.0))
            }
            _ => (None, None),
        };

        let sample = UsageSample {
            cpu_usage_percent,
            memory_usage_percent,
            memory_total_bytes,
            memory_used_bytes,
        };

        if sample == UsageSample::default() {
            None
        } else {
            Some(sample)
        }
    }

    async fn zfs_pools(&self, instance: &str) -> Vec<PoolSample> {
        let mut pools: BTreeMap<String, PoolSample> = BTreeMap::new();

        for metric in [
            "zfs_pool_size_bytes",
            "zfs_pool_allocated_bytes",
            "zfs_pool_free_bytes",
            "zfs_pool_health",
        ] {
            let query = format!("{}{{instance=~\"{}.*\"}}", metric, instance);
            for result in self.results(&query).await {
                let pool_name = result["metric"]["pool"].as_str().unwrap_or("unknown").to_string();
                let Some((_, value)) = parse_sample(&result) else {
                    debug!("Skipping unparsable {} sample for pool {}", metric, pool_name);
                    continue;
                };

                let pool = pools.entry(pool_name.clone()).or_insert_with(|| PoolSample {
                    pool_name,
                    ..Default::default()
                });
                match metric {
                    "zfs_pool_size_bytes" => pool.size_bytes = Some(value),
                    "zfs_pool_allocated_bytes" => pool.allocated_bytes = Some(value),
                    "zfs_pool_free_bytes" => pool.free_bytes = Some(value),
                    _ => pool.health = Some(value),
                }
            }
        }

        pools.into_values().collect()
    }

    async fn mount(
        &self,
        mount: &MountConfig,
        mount_type: MountType,
        instance: &str,
    ) -> Option<StorageSample> {
        if mount.label.is_empty() {
            return None;
        }

        match mount_type {
            MountType::Btrfs => self.btrfs_usage(&mount.label).await,
            MountType::Windows => {
                let selector = format!("volume=\"{}\",instance=~\"{}.*\"", mount.label, instance);
                self.size_and_avail(
                    &format!("windows_logical_disk_size_bytes{{{}}}", selector),
                    &format!("windows_logical_disk_free_bytes{{{}}}", selector),
                )
                .await
            }
            MountType::Filesystem => {
                // Filesystem mounts select the exporter instance by the mount label
                let selector = format!(
                    "instance=~\"{}.*\",mountpoint=\"{}\"",
                    mount.label,
                    mount.display_path()
                );
                self.size_and_avail(
                    &format!("node_filesystem_size_bytes{{{}}}", selector),
                    &format!("node_filesystem_avail_bytes{{{}}}", selector),
                )
                .await
            }
        }
    }
}
