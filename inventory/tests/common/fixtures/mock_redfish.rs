//! Mock out-of-band power controller

use serde_json::{json, Value};
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use inventory::config::Credentials;

const POWER_PATH: &str = "/redfish/v1/Chassis/1/Power";

pub struct MockRedfishServer {
    pub server: MockServer,
}

impl MockRedfishServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Credentials pointing at this server, matching the test secrets
    pub fn credentials(&self) -> Credentials {
        let address = self.server.address();
        Credentials {
            host: Some(address.ip().to_string()),
            username: "admin".to_string(),
            password: "secret".to_string(),
            port: Some(address.port()),
        }
    }

    pub fn port(&self) -> u16 {
        self.server.address().port()
    }

    pub async fn mock_power(&self, watts: f64, average: f64, max: f64, min: f64) {
        self.mock_body(json!({
            "PowerControl": [{
                "PowerConsumedWatts": watts,
                "PowerMetrics": {
                    "AverageConsumedWatts": average,
                    "MaxConsumedWatts": max,
                    "MinConsumedWatts": min
                }
            }]
        }))
        .await;
    }

    pub async fn mock_body(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path(POWER_PATH))
            .and(basic_auth("admin", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(POWER_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}
