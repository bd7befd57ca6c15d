// File: inventory/src/sources/redfish.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{PowerReading, PowerSource};
use crate::config::Credentials;
use crate::constants::http;
use crate::errors::{classify_reqwest_error, SourceError};

const POWER_PATH: &str = "/redfish/v1/Chassis/1/Power";

/// Out-of-band power controller client (Redfish)
pub struct RedfishClient {
    client: Client,
    scheme: String,
}

impl RedfishClient {
    /// Controllers ship self-signed certificates, so verification is off
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
        let mut redfish = Self::new(request_timeout)?;
        redfish.scheme = scheme.to_string();
        Ok(redfish)
    }

    fn power_url(&self, address: &str, port: Option<u16>) -> String {
        match port {
            Some(port) => format!("{}://{}:{}{}", self.scheme, address, port, POWER_PATH),
            None => format!("{}://{}{}", self.scheme, address, POWER_PATH),
        }
    }
}

/// Read the main chassis entry of a `Power` resource
pub fn parse_power(target: &str, json: &Value) -> Result<PowerReading, SourceError> {
    let entry = json["PowerControl"]
        .as_array()
        .and_then(|controls| controls.first())
        .ok_or_else(|| SourceError::NoData {
            target: target.to_string(),
        })?;

    let metrics = &entry["PowerMetrics"];
    Ok(PowerReading {
        power_watts: entry["PowerConsumedWatts"].as_f64(),
        power_average_watts: metrics["AverageConsumedWatts"].as_f64(),
        power_max_watts: metrics["MaxConsumedWatts"].as_f64(),
        power_min_watts: metrics["MinConsumedWatts"].as_f64(),
    })
}

#[async_trait]
impl PowerSource for RedfishClient {
    async fn fetch_power(
        &self,
        host: &str,
        credentials: &Credentials,
    ) -> Result<PowerReading, SourceError> {
        let address = credentials.address(host);
        let url = self.power_url(address, credentials.port);
        debug!("Fetching power reading from {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await
            .map_err(|e| classify_reqwest_error(address, "reading power", e))?;

        if !response.status().is_success() {
            return Err(SourceError::InvalidResponse {
                target: address.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| classify_reqwest_error(address, "decoding power reading", e))?;

        parse_power(address, &json)
    }
}
