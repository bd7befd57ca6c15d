//! Test database utilities for in-memory SQLite testing

use std::sync::Arc;

use inventory::database::Database;

/// In-memory store with the full schema
pub struct TestDatabase;

impl TestDatabase {
    pub async fn new() -> Arc<Database> {
        Arc::new(
            Database::in_memory()
                .await
                .expect("Failed to create in-memory database"),
        )
    }
}
