// File: inventory/src/benchmark/mod.rs
//! CPU benchmark resolver.
//!
//! Lookups are answered from a time-boxed snapshot of every stored record
//! and never touch the network. Unknown CPUs can be queued for a background
//! fetch from the benchmark site; callers get `Pending` immediately and a
//! `Content` event fires once the record is saved. The query that led to a
//! fetch is remembered, so it resolves to the saved record from then on.

pub mod matcher;
pub mod queue;
pub mod scraper;

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::constants::benchmark;
use crate::database::{BenchmarkRecord, Database};
use crate::events::{EventNotifier, EventType};
use crate::sources::BenchmarkSource;
use crate::ttl_map::TtlMap;

pub use matcher::CpuMatcher;
pub use queue::FetchQueue;
pub use scraper::CpuBenchmarkScraper;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "benchmark", rename_all = "snake_case")]
pub enum LookupResult {
    Found(BenchmarkRecord),
    /// A background fetch is queued or already in flight
    Pending,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOutcome {
    Queued,
    AlreadyPending,
}

fn alias_key(cpu_name: &str) -> String {
    cpu_name.trim().to_lowercase()
}

/// Every stored record plus the queries earlier fetches resolved
#[derive(Debug, Default)]
pub struct BenchmarkSnapshot {
    pub records: Vec<BenchmarkRecord>,
    aliases: HashMap<String, String>,
}

impl BenchmarkSnapshot {
    /// A remembered query wins over fuzzy matching
    pub fn lookup(&self, matcher: &CpuMatcher, cpu_name: &str) -> Option<&BenchmarkRecord> {
        self.aliases
            .get(&alias_key(cpu_name))
            .and_then(|canonical| self.records.iter().find(|r| &r.cpu_name == canonical))
            .or_else(|| matcher.find_match(cpu_name, &self.records))
    }
}

#[derive(Clone)]
pub struct BenchmarkResolver {
    database: Arc<Database>,
    source: Arc<dyn BenchmarkSource>,
    notifier: EventNotifier,
    matcher: Arc<CpuMatcher>,
    snapshot: TtlMap<(), Arc<BenchmarkSnapshot>>,
    generation: Arc<AtomicU64>,
    queue: FetchQueue,
}

impl BenchmarkResolver {
    pub fn new(
        database: Arc<Database>,
        source: Arc<dyn BenchmarkSource>,
        notifier: EventNotifier,
        matcher: Arc<CpuMatcher>,
    ) -> Self {
        Self {
            database,
            source,
            notifier,
            matcher,
            snapshot: TtlMap::new(benchmark::ALL_RECORDS_TTL),
            generation: Arc::new(AtomicU64::new(0)),
            queue: FetchQueue::new(benchmark::PENDING_FETCH_TTL),
        }
    }

    /// Stored records and aliases, served from the snapshot cache
    pub async fn snapshot(&self) -> Arc<BenchmarkSnapshot> {
        if let Some(snapshot) = self.snapshot.get(&()).await {
            return snapshot;
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let snapshot = match self.load_snapshot().await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                error!("Failed to read benchmark records: {}", e);
                return Arc::new(BenchmarkSnapshot::default());
            }
        };

        self.snapshot.insert((), snapshot.clone()).await;
        // A write landed while we were reading; what we cached may predate it
        if self.generation.load(Ordering::SeqCst) != generation {
            self.snapshot.clear().await;
        }
        debug!("Cached {} benchmark records", snapshot.records.len());
        snapshot
    }

    async fn load_snapshot(&self) -> Result<BenchmarkSnapshot> {
        Ok(BenchmarkSnapshot {
            records: self.database.get_all_benchmarks().await?,
            aliases: self.database.get_all_benchmark_aliases().await?,
        })
    }

    pub async fn get_benchmark(&self, cpu_name: &str) -> Option<BenchmarkRecord> {
        let snapshot = self.snapshot().await;
        let found = snapshot.lookup(&self.matcher, cpu_name).cloned();
        match &found {
            Some(record) => debug!("Benchmark for {} resolved to {}", cpu_name, record.cpu_name),
            None => debug!("No benchmark found for: {}", cpu_name),
        }
        found
    }

    /// Resolve many names against one snapshot
    pub async fn get_benchmarks_batch(
        &self,
        cpu_names: &[String],
    ) -> BTreeMap<String, Option<BenchmarkRecord>> {
        let snapshot = self.snapshot().await;
        cpu_names
            .iter()
            .map(|name| (name.clone(), snapshot.lookup(&self.matcher, name).cloned()))
            .collect()
    }

    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.snapshot.clear().await;
    }

    pub async fn save_benchmark(&self, record: &BenchmarkRecord) -> Result<()> {
        let result = self.database.upsert_benchmark(record).await;
        self.invalidate().await;
        result
    }

    /// Delete the record stored under exactly `cpu_name`
    pub async fn clear_benchmark(&self, cpu_name: &str) -> Result<bool> {
        let result = self.database.delete_benchmark(cpu_name).await;
        self.invalidate().await;
        result
    }

    pub async fn is_fetch_pending(&self, cpu_name: &str) -> bool {
        self.queue.is_pending(cpu_name).await
    }

    /// Search the benchmark site and store the result under its canonical name.
    /// The query is remembered so it resolves to that record from then on.
    pub async fn fetch_and_save(&self, cpu_name: &str) -> Result<BenchmarkRecord> {
        info!("Fetching CPU benchmark for: {}", cpu_name);
        let record = self
            .source
            .search(cpu_name)
            .await
            .ok_or_else(|| anyhow!("No benchmark data found for {}", cpu_name))?;

        let result = self.database.upsert_benchmark(&record).await;
        if result.is_ok() {
            let key = alias_key(cpu_name);
            if key != alias_key(&record.cpu_name) {
                if let Err(e) = self
                    .database
                    .upsert_benchmark_alias(&key, &record.cpu_name)
                    .await
                {
                    warn!("Failed to remember {} as {}: {}", cpu_name, record.cpu_name, e);
                }
            }
        }
        self.invalidate().await;
        result?;

        info!(
            "Saved benchmark for {} as {} (multi={:?}, single={:?})",
            cpu_name, record.cpu_name, record.multi_thread_score, record.single_thread_score
        );
        Ok(record)
    }

    /// Start a detached fetch unless one is already in flight for this name
    pub async fn queue_fetch(&self, cpu_name: &str) -> QueueOutcome {
        if !self.queue.try_add(cpu_name).await {
            return QueueOutcome::AlreadyPending;
        }

        info!("Queued background fetch for: {}", cpu_name);

        let resolver = self.clone();
        let cpu_name = cpu_name.to_string();
        tokio::spawn(async move {
            let result = resolver.fetch_and_save(&cpu_name).await;
            resolver.queue.remove(&cpu_name).await;
            match result {
                Ok(_) => resolver.notifier.notify(EventType::Content),
                Err(e) => warn!("Background fetch failed for {}: {}", cpu_name, e),
            }
        });

        QueueOutcome::Queued
    }

    /// Returns how many names were newly queued
    pub async fn queue_fetch_batch(&self, cpu_names: &[String]) -> usize {
        let mut queued = 0;
        for name in cpu_names {
            if self.queue_fetch(name).await == QueueOutcome::Queued {
                queued += 1;
            }
        }
        queued
    }

    pub async fn lookup_or_queue(&self, cpu_name: &str, fetch: bool) -> LookupResult {
        if let Some(record) = self.get_benchmark(cpu_name).await {
            return LookupResult::Found(record);
        }

        if fetch {
            self.queue_fetch(cpu_name).await;
            return LookupResult::Pending;
        }

        if self.is_fetch_pending(cpu_name).await {
            LookupResult::Pending
        } else {
            LookupResult::NotFound
        }
    }
}
