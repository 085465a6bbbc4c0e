//! Unified error types for resticmon

use thiserror::Error;

/// Unified error type for all resticmon operations
#[derive(Error, Debug)]
pub enum ResticmonError {
    // Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Backup definition not found: {0}")]
    JobNotFound(String),

    // Child process protocol errors
    #[error("Unparseable restic event: {0}")]
    EventParse(String),

    // Hook errors
    #[error("Hook failed: {0}")]
    Hook(String),

    // Telemetry errors
    #[error("Sink delivery failed: {0}")]
    Sink(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using ResticmonError
pub type Result<T> = std::result::Result<T, ResticmonError>;
