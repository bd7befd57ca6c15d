// File: inventory/src/web/mod.rs
pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::benchmark::BenchmarkResolver;
use crate::events::EventNotifier;
use crate::services::InventoryService;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<InventoryService>,
    pub benchmarks: BenchmarkResolver,
    pub notifier: EventNotifier,
}

impl AppState {
    pub fn new(
        inventory: Arc<InventoryService>,
        benchmarks: BenchmarkResolver,
        notifier: EventNotifier,
    ) -> Self {
        Self {
            inventory,
            benchmarks,
            notifier,
        }
    }
}
