//! Mock hypervisor management API (vSphere Automation REST)

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use inventory::config::Credentials;

pub const SESSION_TOKEN: &str = "b00b1e5-session";

pub struct MockVsphereServer {
    pub server: MockServer,
}

impl MockVsphereServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn credentials(&self) -> Credentials {
        let address = self.server.address();
        Credentials {
            host: Some(address.ip().to_string()),
            username: "admin".to_string(),
            password: "secret".to_string(),
            port: Some(address.port()),
        }
    }

    pub async fn mock_login(&self) {
        Mock::given(method("POST"))
            .and(path("/api/session"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!(SESSION_TOKEN)))
            .mount(&self.server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/api/session"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_login_rejected(&self) {
        Mock::given(method("POST"))
            .and(path("/api/session"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&self.server)
            .await;
    }

    /// VM listing; each entry is `(id, name, power_state)`
    pub async fn mock_vm_list(&self, vms: &[(&str, &str, &str)]) {
        let listing: Vec<Value> = vms
            .iter()
            .map(|(id, name, state)| {
                json!({
                    "vm": id,
                    "name": name,
                    "power_state": state,
                    "cpu_count": 2,
                    "memory_size_MiB": 4096
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/api/vcenter/vm"))
            .and(header("vmware-api-session-id", SESSION_TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(listing)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_vm_detail(&self, id: &str, name: &str, cpus: i64, ram_mib: i64, disk_bytes: &[f64]) {
        let disks: serde_json::Map<String, Value> = disk_bytes
            .iter()
            .enumerate()
            .map(|(i, capacity)| (format!("{}", 2000 + i), json!({ "capacity": capacity })))
            .collect();

        Mock::given(method("GET"))
            .and(path(format!("/api/vcenter/vm/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": name,
                "cpu": { "count": cpus },
                "memory": { "size_MiB": ram_mib },
                "power_state": "POWERED_ON",
                "disks": disks
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_vm_detail_error(&self, id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/vcenter/vm/{}", id)))
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_system(&self, version: &str, uptime_seconds: f64) {
        Mock::given(method("GET"))
            .and(path("/api/appliance/system/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "product": "VMware ESXi",
                "version": version
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/appliance/system/uptime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(uptime_seconds)))
            .mount(&self.server)
            .await;
    }
}
