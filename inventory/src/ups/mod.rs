//! UPS daemon adapter speaking the NUT line protocol.

pub mod client;
pub mod parse;

pub use client::NutClient;
