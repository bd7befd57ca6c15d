//! Test configuration builder for creating config directories programmatically

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use inventory::config::ConfigManager;

struct CredentialEntry {
    name: String,
    address: Option<String>,
    port: Option<u16>,
}

/// Builder for a config directory with main.toml, machine files and secrets
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    prometheus_url: Option<String>,
    instance_map: Vec<(String, String)>,
    ups: Vec<(String, u16, Option<String>)>,
    machines: Vec<(String, String)>,
    esxi: Vec<CredentialEntry>,
    ilo: Vec<CredentialEntry>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
            prometheus_url: None,
            instance_map: Vec::new(),
            ups: Vec::new(),
            machines: Vec::new(),
            esxi: Vec::new(),
            ilo: Vec::new(),
        }
    }

    pub fn with_prometheus(mut self, url: &str) -> Self {
        self.prometheus_url = Some(url.to_string());
        self
    }

    pub fn with_instance_mapping(mut self, host: &str, instance: &str) -> Self {
        self.instance_map.push((host.to_string(), instance.to_string()));
        self
    }

    pub fn with_ups(mut self, host: &str, port: u16, ups_name: Option<&str>) -> Self {
        self.ups
            .push((host.to_string(), port, ups_name.map(str::to_string)));
        self
    }

    /// Raw body of `<file_name>.toml`, including the `[machine]` header
    pub fn with_machine(mut self, file_name: &str, body: &str) -> Self {
        self.machines.push((file_name.to_string(), body.to_string()));
        self
    }

    pub fn with_esxi(mut self, name: &str, address: Option<&str>, port: Option<u16>) -> Self {
        self.esxi.push(CredentialEntry {
            name: name.to_string(),
            address: address.map(str::to_string),
            port,
        });
        self
    }

    pub fn with_ilo(mut self, name: &str, address: Option<&str>, port: Option<u16>) -> Self {
        self.ilo.push(CredentialEntry {
            name: name.to_string(),
            address: address.map(str::to_string),
            port,
        });
        self
    }

    fn main_toml(&self) -> String {
        let mut content = String::from("host = \"127.0.0.1\"\nport = 0\ndata_dir = \"data\"\n");
        content.push_str("request_timeout_seconds = 5\nshutdown_timeout_seconds = 1\n");

        if let Some(url) = &self.prometheus_url {
            content.push_str(&format!("\n[prometheus]\nurl = \"{}\"\n", url));
            if !self.instance_map.is_empty() {
                content.push_str("\n[prometheus.instance_map]\n");
                for (host, instance) in &self.instance_map {
                    content.push_str(&format!("\"{}\" = \"{}\"\n", host, instance));
                }
            }
        }

        for (host, port, ups_name) in &self.ups {
            content.push_str(&format!("\n[[ups]]\nhost = \"{}\"\nport = {}\n", host, port));
            if let Some(name) = ups_name {
                content.push_str(&format!("ups_name = \"{}\"\n", name));
            }
        }
        content
    }

    fn credentials_toml(section: &str, entries: &[CredentialEntry]) -> String {
        let mut content = String::new();
        for entry in entries {
            content.push_str(&format!("\n[{}.\"{}\"]\n", section, entry.name));
            content.push_str("username = \"admin\"\npassword = \"secret\"\n");
            if let Some(address) = &entry.address {
                content.push_str(&format!("host = \"{}\"\n", address));
            }
            if let Some(port) = entry.port {
                content.push_str(&format!("port = {}\n", port));
            }
        }
        content
    }

    /// Write every file into the temp directory
    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        fs::write(config_dir.join("main.toml"), self.main_toml()).expect("Failed to write main.toml");

        for (file_name, body) in &self.machines {
            fs::write(config_dir.join(format!("{}.toml", file_name)), body)
                .expect("Failed to write machine file");
        }

        if !self.esxi.is_empty() || !self.ilo.is_empty() {
            let secrets = format!(
                "{}{}",
                Self::credentials_toml("esxi", &self.esxi),
                Self::credentials_toml("ilo", &self.ilo)
            );
            fs::write(config_dir.join("secrets.toml"), secrets).expect("Failed to write secrets.toml");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A written config directory; removed when dropped
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn path(&self) -> &Path {
        &self.config_dir
    }

    pub fn write_machine(&self, file_name: &str, body: &str) {
        fs::write(self.config_dir.join(format!("{}.toml", file_name)), body)
            .expect("Failed to write machine file");
    }

    pub fn write_file(&self, file_name: &str, body: &str) {
        fs::write(self.config_dir.join(file_name), body).expect("Failed to write config file");
    }

    pub async fn manager(&self) -> Arc<ConfigManager> {
        Arc::new(
            ConfigManager::new(self.config_dir.clone())
                .await
                .expect("Failed to load test config"),
        )
    }
}
