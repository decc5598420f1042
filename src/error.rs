//! Error types for the Brain Move metrics engine

use thiserror::Error;

use crate::types::ValidationReport;

/// Errors that can occur while scoring exercises or handling session data
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Invalid word submission: {}", .0.errors.join(", "))]
    InvalidInput(ValidationReport),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors raised by a persistence backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize sessions: {0}")]
    Serialization(String),

    #[error("Failed to deserialize sessions: {0}")]
    Deserialization(String),
}
