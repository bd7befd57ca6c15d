use chrono::Utc;
use tracing::{error, info, warn};

use super::Collector;
use crate::config::Config;
use crate::database::PowerRecord;

impl Collector {
    /// Power readings never drive reachability; a failed read keeps the
    /// previous record.
    pub(super) async fn collect_power(&self, config: &Config) -> bool {
        let mut changed = false;
        for (host, credentials) in &config.secrets.ilo {
            info!("Collecting power data from {}...", host);

            let reading = match self.sources.power.fetch_power(host, credentials).await {
                Ok(reading) => reading,
                Err(e) => {
                    warn!("Failed to collect power data from {}: {}", host, e);
                    continue;
                }
            };

            let record = PowerRecord {
                host: host.clone(),
                power_watts: reading.power_watts,
                power_average_watts: reading.power_average_watts,
                power_max_watts: reading.power_max_watts,
                power_min_watts: reading.power_min_watts,
                collected_at: Utc::now(),
            };

            match self.database.upsert_power(&record).await {
                Ok(()) => {
                    info!("  Cached power data for {}: {:?} W", host, record.power_watts);
                    changed = true;
                }
                Err(e) => error!("Failed to store power data for {}: {}", host, e),
            }
        }
        changed
    }
}
