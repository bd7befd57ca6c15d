// File: inventory/src/ttl_map.rs

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Concurrent map whose entries expire `ttl` after insertion.
/// Expired entries are dropped lazily when they are read.
pub struct TtlMap<K, V> {
    entries: Arc<Mutex<HashMap<K, Entry<V>>>>,
    ttl: Duration,
}

impl<K, V> Clone for TtlMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            ttl: self.ttl,
        }
    }
}

impl<K, V> TtlMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    pub async fn insert(&self, key: K, value: V) {
        self.entries.lock().await.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Insert only when no live entry exists. Returns true when inserted.
    pub async fn insert_if_absent(&self, key: K, value: V) -> bool {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get(&key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return false;
            }
        }
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
        true
    }

    pub async fn contains(&self, key: &K) -> bool {
        self.get(key).await.is_some()
    }

    pub async fn remove(&self, key: &K) -> Option<V> {
        self.entries.lock().await.remove(key).map(|entry| entry.value)
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of live entries; expired ones are purged first
    pub async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
