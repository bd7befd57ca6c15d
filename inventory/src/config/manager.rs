// File: inventory/src/config/manager.rs
use super::{Config, MachineConfig, MachineConfigFile, SecretsFile};
use crate::errors::ConfigError;
use anyhow::{anyhow, Result};
use glob::glob;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const MAIN_CONFIG_FILE: &str = "main.toml";
const SECRETS_FILE: &str = "secrets.toml";

pub struct ConfigManager {
    config_dir: PathBuf,
    current_config: RwLock<Arc<Config>>,
}

impl ConfigManager {
    pub async fn new(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            config_dir,
            current_config: RwLock::new(Arc::new(config)),
        })
    }

    pub async fn get_current_config(&self) -> Arc<Config> {
        self.current_config.read().await.clone()
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Re-read the configuration directory and swap it in.
    /// On failure the previous configuration stays current.
    pub async fn reload(&self) -> Result<Arc<Config>> {
        let config = Arc::new(Self::load_configuration(&self.config_dir).await?);
        *self.current_config.write().await = config.clone();
        debug!("Configuration reloaded from {}", self.config_dir.display());
        Ok(config)
    }

    async fn load_configuration(config_dir: &Path) -> Result<Config> {
        let main_config_path = config_dir.join(MAIN_CONFIG_FILE);
        let main_config_content =
            fs::read_to_string(&main_config_path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: main_config_path.display().to_string(),
                    reason: e.to_string(),
                })?;

        let mut config: Config =
            toml::from_str(&main_config_content).map_err(|e| ConfigError::ParseError {
                path: main_config_path.display().to_string(),
                reason: e.to_string(),
            })?;

        config.machines = Self::load_machines(config_dir).await?;
        config.secrets = SecretsFile::load(&config_dir.join(SECRETS_FILE))?;

        info!(
            "Loaded {} machines, {} hypervisors, {} power controllers, {} UPS daemons",
            config.machines.len(),
            config.secrets.esxi.len(),
            config.secrets.ilo.len(),
            config.ups.len()
        );

        Ok(config)
    }

    /// Load every `<machine>.toml` in the directory, sorted by machine name
    pub async fn load_machines(config_dir: &Path) -> Result<Vec<MachineConfig>> {
        let pattern = format!("{}/*.toml", config_dir.display());
        let mut machines = Vec::new();

        for entry in glob(&pattern).map_err(|e| anyhow!("Glob pattern error: {}", e))? {
            let path = entry.map_err(|e| anyhow!("Glob entry error: {}", e))?;
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("Invalid filename"))?;

            if filename == MAIN_CONFIG_FILE || filename == SECRETS_FILE {
                continue;
            }

            let file_stem = filename
                .strip_suffix(".toml")
                .ok_or_else(|| anyhow!("Invalid config filename: {}", filename))?;

            debug!("Loading machine config: {}", path.display());

            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;

            let machine_file: MachineConfigFile = match toml::from_str(&content) {
                Ok(file) => file,
                Err(e) => {
                    warn!("Skipping unparsable machine config {}: {}", path.display(), e);
                    continue;
                }
            };

            let mut machine = machine_file.machine;
            if machine.name.is_empty() {
                machine.name = file_stem.to_string();
            }
            machines.push(machine);
        }

        machines.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(machines)
    }
}
