//! Error types for the Reach Fabric Core.

use thiserror::Error;

/// Core errors that can occur during hashing and canonicalization.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("update called on a finalized hasher")]
    UpdateAfterFinalize,

    #[error("hasher already finalized")]
    AlreadyFinalized,

    #[error("stream read failed: {0}")]
    Stream(#[from] std::io::Error),

    #[error("stream hashing cancelled after {bytes_read} bytes")]
    Cancelled { bytes_read: u64 },

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
