use chrono::Utc;
use tracing::{error, info, warn};

use super::Collector;
use crate::config::Config;
use crate::database::{UpsClientRecord, UpsRecord};
use crate::sources::UpsSnapshot;

pub(super) fn ups_record(host: &str, snapshot: &UpsSnapshot) -> Option<UpsRecord> {
    let variables = snapshot.variables.clone()?;
    Some(UpsRecord {
        ups_name: snapshot.ups_name.clone(),
        host: host.to_string(),
        model: variables.model,
        battery_charge: variables.battery_charge,
        battery_runtime: variables.battery_runtime,
        ups_load: variables.ups_load,
        ups_status: variables.ups_status,
        ups_temperature: variables.ups_temperature,
        input_voltage: variables.input_voltage,
        output_voltage: variables.output_voltage,
        collected_at: Utc::now(),
    })
}

impl Collector {
    pub(super) async fn collect_ups(&self, config: &Config) -> bool {
        let mut changed = false;

        for target in &config.ups {
            info!("Collecting UPS data from {}:{}...", target.host, target.port);

            let snapshots = match self.sources.ups.fetch_all(target).await {
                Ok(snapshots) => snapshots,
                Err(e) => {
                    warn!("Failed to collect UPS data from {}: {}", target.host, e);
                    continue;
                }
            };

            for snapshot in &snapshots {
                if let Some(record) = ups_record(&target.host, snapshot) {
                    match self.database.upsert_ups(&record).await {
                        Ok(()) => changed = true,
                        Err(e) => error!(
                            "Failed to store UPS {} on {}: {}",
                            snapshot.ups_name, target.host, e
                        ),
                    }
                }

                let now = Utc::now();
                let clients: Vec<UpsClientRecord> = snapshot
                    .clients
                    .iter()
                    .map(|ip| UpsClientRecord {
                        ups_name: snapshot.ups_name.clone(),
                        host: target.host.clone(),
                        client_ip: ip.clone(),
                        client_hostname: None,
                        collected_at: now,
                    })
                    .collect();

                if let Err(e) = self
                    .database
                    .replace_ups_clients(&snapshot.ups_name, &target.host, &clients)
                    .await
                {
                    error!(
                        "Failed to store clients of UPS {} on {}: {}",
                        snapshot.ups_name, target.host, e
                    );
                }
            }

            info!("  Cached {} UPS devices from {}", snapshots.len(), target.host);
        }

        changed
    }
}
