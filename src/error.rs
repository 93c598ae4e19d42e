//! Crate-wide error type.
//!
//! Only the storage layer is fallible; the cache's public operations contain
//! every storage failure (logged, never propagated), so `PilotError` mostly
//! travels between a [`crate::storage::KeyValueStore`] implementation and the
//! persistence code that calls it.

use thiserror::Error;

/// Errors produced by DealPilot components.
#[derive(Debug, Error)]
pub enum PilotError {
    /// Backend-specific storage failure (database down, quota exceeded, ...).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem error from the file-backed store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PilotError>;
