pub mod benchmark;
pub mod cache_refresher;
pub mod collector;
pub mod config;
pub mod constants;
pub mod database;
pub mod errors;
pub mod events;
pub mod reachability;
pub mod scheduler;
pub mod services;
pub mod sources;
pub mod ttl_map;
pub mod ups;
pub mod web;

// Re-export commonly used types
pub use benchmark::BenchmarkResolver;
pub use cache_refresher::CacheRefresher;
pub use collector::{Collector, Sources};
pub use config::{Config, ConfigManager};
pub use database::Database;
pub use events::{EventNotifier, EventType};
pub use scheduler::{Job, Scheduler};
pub use services::InventoryService;
