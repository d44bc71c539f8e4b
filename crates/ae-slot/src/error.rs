//! Error types for the slot core

use thiserror::Error;

/// Spin and session errors
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Insufficient balance: bet {bet:.2} exceeds balance {balance:.2}")]
    InsufficientBalance { bet: f64, balance: f64 },

    #[error("Spin already in progress")]
    SpinInProgress,

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
