// File: inventory/src/cache_refresher.rs
//! Keeps the configuration cache entry in step with the files on disk.
//!
//! Each pass re-reads the configuration directory and compares the public
//! part (service settings and machines, no credentials) with the cached
//! copy. Only a real difference causes a write and a `Content` event.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::{Config, ConfigManager};
use crate::constants::keys;
use crate::database::Database;
use crate::events::{EventNotifier, EventType};
use crate::scheduler::{Job, Scheduler};

/// Cached view of the configuration; secrets are never included
pub fn config_blob(config: &Config) -> Result<Value> {
    let mut blob = serde_json::to_value(config)?;
    if let Value::Object(sections) = &mut blob {
        sections.insert("machine".to_string(), serde_json::to_value(&config.machines)?);
    }
    Ok(blob)
}

pub struct CacheRefresher {
    config_manager: Arc<ConfigManager>,
    database: Arc<Database>,
    notifier: EventNotifier,
}

impl CacheRefresher {
    pub fn new(
        config_manager: Arc<ConfigManager>,
        database: Arc<Database>,
        notifier: EventNotifier,
    ) -> Self {
        Self {
            config_manager,
            database,
            notifier,
        }
    }

    /// Populate the cache once, then hand the refresher to a running scheduler.
    /// Listeners always get one `Content` event for the startup state.
    pub async fn start(
        refresher: Arc<CacheRefresher>,
        interval: Duration,
        shutdown_timeout: Duration,
    ) -> Scheduler {
        if !refresher.refresh().await {
            refresher.notifier.notify(EventType::Content);
        }

        let scheduler = Scheduler::new(refresher, interval, shutdown_timeout).delay_first_pass();
        scheduler.start().await;
        scheduler
    }

    /// Returns true when the cache entry was rewritten
    pub async fn refresh(&self) -> bool {
        let config = match self.config_manager.reload().await {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to reload configuration, keeping cached copy: {}", e);
                return false;
            }
        };

        let blob = match config_blob(&config) {
            Ok(blob) => blob,
            Err(e) => {
                error!("Failed to serialize configuration: {}", e);
                return false;
            }
        };

        let cached = match self.database.get_cache(keys::CONFIG_CACHE_KEY).await {
            Ok(entry) => entry.map(|entry| entry.value),
            Err(e) => {
                warn!("Failed to read config cache: {}", e);
                None
            }
        };

        if cached.as_ref() == Some(&blob) {
            debug!("Config cache unchanged");
            return false;
        }

        if let Err(e) = self.database.set_cache(keys::CONFIG_CACHE_KEY, &blob).await {
            error!("Failed to write config cache: {}", e);
            return false;
        }

        info!("Config cache updated");
        self.notifier.notify(EventType::Content);
        true
    }
}

#[async_trait]
impl Job for CacheRefresher {
    fn name(&self) -> &str {
        "cache refresher"
    }

    async fn run_once(&self) {
        self.refresh().await;
    }
}
