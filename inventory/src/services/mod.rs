// File: inventory/src/services/mod.rs

pub mod inventory_service;

pub use inventory_service::{InventoryService, UpsView};
