//! Error types for the phrase recognition engine
//!
//! Structured error definitions via thiserror; collaborator seams
//! (typo correction, host-supplied stores) use anyhow on their side
//! and are converted at the boundary.

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Key-value storage adapter failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error (file-backed stores)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization of a durable snapshot failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A phrase could not be compiled into a search pattern
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Typo-correction collaborator failed
    #[error("Correction error: {0}")]
    Correction(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
