//! HTTP request handlers for the inventory API.
//!
//! This module is organized by domain:
//! - `common` - Response envelope and shared helpers
//! - `hosts` - Host uptime and status
//! - `vms` - VM inventory and manual refresh
//! - `power` - Power controller readings
//! - `storage` - ZFS pools and mount points
//! - `ups` - UPS devices and their clients
//! - `cpu` - CPU benchmark lookups
//! - `config` - Cached configuration and collection status
//! - `events` - Server-sent change notifications

pub mod common;
pub mod config;
pub mod cpu;
pub mod events;
pub mod hosts;
pub mod power;
pub mod storage;
pub mod ups;
pub mod vms;

pub use config::*;
pub use cpu::*;
pub use events::*;
pub use hosts::*;
pub use power::*;
pub use storage::*;
pub use ups::*;
pub use vms::*;
