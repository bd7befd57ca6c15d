//! Custom error types for the inventory service
//!
//! Adapters report expected failures through `SourceError`; everything above
//! the collector boundary converts those into a `CollectionOutcome` instead
//! of propagating them.

use std::fmt;

/// Main error type for the inventory service
#[derive(Debug)]
pub enum InventoryError {
    /// Configuration-related errors
    Config(ConfigError),

    /// Failures reaching or parsing an upstream source
    Source(SourceError),

    /// Local store errors
    Database(DatabaseError),

    /// Other errors with context
    Other(String),
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Configuration parsing error
    ParseError { path: String, reason: String },

    /// Missing required configuration
    MissingRequired { field: String },
}

/// Upstream source error variants
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Network or authentication failure reaching the source
    ConnectionFailed { target: String, reason: String },

    /// The source did not answer in time
    Timeout { target: String, operation: String },

    /// The source answered with something we could not normalize
    InvalidResponse { target: String, reason: String },

    /// The source answered but had nothing for this target
    NoData { target: String },
}

/// Local store error variants
#[derive(Debug)]
pub enum DatabaseError {
    /// Connection failed
    ConnectionFailed { reason: String },

    /// Query execution failed
    QueryFailed { table: String, reason: String },

    /// Cached value could not be (de)serialized
    SerializationError { reason: String },
}

impl SourceError {
    /// True for failures that mean the target could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            SourceError::ConnectionFailed { .. } | SourceError::Timeout { .. }
        )
    }

    pub fn target(&self) -> &str {
        match self {
            SourceError::ConnectionFailed { target, .. }
            | SourceError::Timeout { target, .. }
            | SourceError::InvalidResponse { target, .. }
            | SourceError::NoData { target } => target,
        }
    }
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryError::Config(e) => write!(f, "Configuration error: {}", e),
            InventoryError::Source(e) => write!(f, "Source error: {}", e),
            InventoryError::Database(e) => write!(f, "Database error: {}", e),
            InventoryError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::ParseError { path, reason } => {
                write!(f, "Failed to parse config '{}': {}", path, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::ConnectionFailed { target, reason } => {
                write!(f, "Connection to {} failed: {}", target, reason)
            }
            SourceError::Timeout { target, operation } => {
                write!(f, "Timeout while {} on {}", operation, target)
            }
            SourceError::InvalidResponse { target, reason } => {
                write!(f, "Invalid response from {}: {}", target, reason)
            }
            SourceError::NoData { target } => write!(f, "No data returned for {}", target),
        }
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::ConnectionFailed { reason } => {
                write!(f, "Database connection failed: {}", reason)
            }
            DatabaseError::QueryFailed { table, reason } => {
                write!(f, "Query on '{}' failed: {}", table, reason)
            }
            DatabaseError::SerializationError { reason } => {
                write!(f, "Serialization error: {}", reason)
            }
        }
    }
}

impl std::error::Error for InventoryError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for SourceError {}
impl std::error::Error for DatabaseError {}

impl From<anyhow::Error> for InventoryError {
    fn from(err: anyhow::Error) -> Self {
        InventoryError::Other(err.to_string())
    }
}

impl From<ConfigError> for InventoryError {
    fn from(err: ConfigError) -> Self {
        InventoryError::Config(err)
    }
}

impl From<SourceError> for InventoryError {
    fn from(err: SourceError) -> Self {
        InventoryError::Source(err)
    }
}

impl From<DatabaseError> for InventoryError {
    fn from(err: DatabaseError) -> Self {
        InventoryError::Database(err)
    }
}

/// Classify a reqwest failure at an adapter boundary
pub fn classify_reqwest_error(target: &str, operation: &str, err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout {
            target: target.to_string(),
            operation: operation.to_string(),
        }
    } else if err.is_connect() || err.is_request() {
        SourceError::ConnectionFailed {
            target: target.to_string(),
            reason: err.to_string(),
        }
    } else {
        SourceError::InvalidResponse {
            target: target.to_string(),
            reason: err.to_string(),
        }
    }
}
