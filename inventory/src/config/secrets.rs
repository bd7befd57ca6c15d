// File: inventory/src/config/secrets.rs
//! Secrets loader for hypervisor and power-controller credentials.
//!
//! Credentials live in a separate TOML file (config/secrets.toml) that should
//! be excluded from version control.
//!
//! Example secrets.toml:
//! ```toml
//! [esxi."esxi-1.example.net"]
//! username = "root"
//! password = "secret"
//!
//! [ilo."server-1.example.net"]
//! host = "ilo-server-1.example.net"
//! username = "Administrator"
//! password = "secret"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Address to connect to when it differs from the configured host name
    pub host: Option<String>,
    pub username: String,
    pub password: String,
    pub port: Option<u16>,
}

impl Credentials {
    pub fn address<'a>(&'a self, name: &'a str) -> &'a str {
        self.host.as_deref().unwrap_or(name)
    }
}

/// Structure matching the secrets.toml file format
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecretsFile {
    #[serde(default)]
    pub esxi: BTreeMap<String, Credentials>,
    #[serde(default)]
    pub ilo: BTreeMap<String, Credentials>,
}

impl SecretsFile {
    /// Load secrets from the specified file path.
    /// Returns empty secrets if the file doesn't exist.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        if !secrets_path.exists() {
            warn!(
                "Secrets file not found at {:?}, hypervisor and power collection disabled",
                secrets_path
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file: {:?}", secrets_path))?;

        let secrets: SecretsFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse secrets file: {:?}", secrets_path))?;

        info!(
            "Loaded credentials for {} hypervisors and {} power controllers from {:?}",
            secrets.esxi.len(),
            secrets.ilo.len(),
            secrets_path
        );

        Ok(secrets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_secrets() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[esxi."esxi-1.example.net"]
username = "root"
password = "pw"
port = 8443

[ilo.server-1]
host = "10.0.0.5"
username = "admin"
password = "pw2"
"#
        )
        .unwrap();

        let secrets = SecretsFile::load(file.path()).unwrap();
        let esxi = secrets.esxi.get("esxi-1.example.net").unwrap();
        assert_eq!(esxi.username, "root");
        assert_eq!(esxi.port, Some(8443));
        assert_eq!(esxi.address("esxi-1.example.net"), "esxi-1.example.net");

        let ilo = secrets.ilo.get("server-1").unwrap();
        assert_eq!(ilo.address("server-1"), "10.0.0.5");
    }

    #[test]
    fn test_missing_secrets_file() {
        let secrets = SecretsFile::load(Path::new("/nonexistent/secrets.toml")).unwrap();
        assert!(secrets.esxi.is_empty());
        assert!(secrets.ilo.is_empty());
    }
}
