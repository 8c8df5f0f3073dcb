//! Core error types for pomotimer-core.
//!
//! Engine operations are total: the only error a caller can see from them is
//! a rejected duration. Persistence and configuration have their own enums.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomotimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by [`TimerEngine`](crate::TimerEngine) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Negative session length requested. No state was changed.
    #[error("Invalid duration: {requested} seconds (must be >= 0)")]
    InvalidDuration { requested: i64 },

    /// The engine was created outside of a Tokio runtime.
    #[error("Timer engine requires a running Tokio runtime")]
    NoRuntime,
}

/// Persistence-store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// A stored value could not be decoded.
    #[error("Corrupt value for '{key}': {value}")]
    Corrupt { key: String, value: String },

    #[error("Failed to access data directory: {0}")]
    DataDir(String),

    /// The store lock was poisoned by a panicking writer.
    #[error("Store is unavailable")]
    Unavailable,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
