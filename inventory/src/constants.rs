//! Central repository for intervals, timeouts, and fixed keys
//!
//! This module organizes constants by category so that the collector,
//! the cache refresher and the adapters share one source of truth.

use std::time::Duration;

/// Scheduler intervals and shutdown bounds
pub mod schedule {
    /// Default interval between two collection ticks
    pub const COLLECT_INTERVAL_SECONDS: u64 = 300;

    /// Default interval between two cache refresh passes
    pub const CACHE_REFRESH_INTERVAL_SECONDS: u64 = 300;

    /// How long `stop()` waits for a worker to exit before giving up
    pub const SHUTDOWN_TIMEOUT_SECONDS: u64 = 5;
}

/// Upstream adapter timeouts
pub mod http {
    use super::Duration;

    /// Default timeout for requests to Prometheus, Redfish and vSphere
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// User agent presented to the benchmark site
    pub const BENCHMARK_USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
}

/// NUT line protocol
pub mod nut {
    use super::Duration;

    pub const DEFAULT_PORT: u16 = 3493;

    /// Connect and per-read timeout on the NUT socket
    pub const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);

    pub const READ_CHUNK_SIZE: usize = 4096;
}

/// CPU benchmark resolver
pub mod benchmark {
    use super::Duration;

    /// Lifetime of the in-memory "all records" snapshot
    pub const ALL_RECORDS_TTL: Duration = Duration::from_secs(3600);

    /// Upper bound on how long a fetch may stay pending before the name can
    /// be queued again
    pub const PENDING_FETCH_TTL: Duration = Duration::from_secs(600);

    /// Candidates must score strictly above this to be accepted
    pub const MATCH_THRESHOLD: f64 = 0.5;

    pub const MULTITHREAD_URL: &str = "https://www.cpubenchmark.net/multithread/";
    pub const SINGLETHREAD_URL: &str = "https://www.cpubenchmark.net/singleThread.html";
    pub const CPU_LIST_URL: &str = "https://www.cpubenchmark.net/cpu_list.php";
}

/// Keys and sentinels shared between writers and readers
pub mod keys {
    /// Cache slot holding the parsed machine configuration
    pub const CONFIG_CACHE_KEY: &str = "config";

    /// Sentinel returned for current-state fields of unreachable hosts
    pub const UNKNOWN: &str = "unknown";

    pub const RUNNING: &str = "running";
}

/// Default web bind settings
pub mod web {
    pub const DEFAULT_HOST: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 5000;
}
