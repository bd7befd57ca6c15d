// File: inventory/src/benchmark/queue.rs
use std::time::Duration;
use tracing::debug;

use crate::ttl_map::TtlMap;

/// Names with a background fetch in flight. At most one fetch per name;
/// entries expire after `ttl` in case a fetch never reports back.
#[derive(Clone)]
pub struct FetchQueue {
    pending: TtlMap<String, ()>,
}

impl FetchQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: TtlMap::new(ttl),
        }
    }

    /// Claim `cpu_name`. Returns false when a fetch is already pending.
    pub async fn try_add(&self, cpu_name: &str) -> bool {
        let added = self.pending.insert_if_absent(cpu_name.to_string(), ()).await;
        if !added {
            debug!("Fetch already pending for: {}", cpu_name);
        }
        added
    }

    pub async fn remove(&self, cpu_name: &str) {
        self.pending.remove(&cpu_name.to_string()).await;
    }

    pub async fn is_pending(&self, cpu_name: &str) -> bool {
        self.pending.contains(&cpu_name.to_string()).await
    }

    pub async fn len(&self) -> usize {
        self.pending.len().await
    }
}
