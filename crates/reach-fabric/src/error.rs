//! Error types for the fabric facade.

use reach_fabric_core::CoreError;
use reach_fabric_merkle::MerkleError;
use reach_fabric_pack::PackError;
use reach_fabric_replay::ReplayError;
use thiserror::Error;

/// Errors from any fabric component.
#[derive(Debug, Error)]
pub enum FabricError {
    /// Canonicalization or hashing error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Merkle tree or proof error.
    #[error("merkle error: {0}")]
    Merkle(#[from] MerkleError),

    /// Pack manifest error.
    #[error("pack error: {0}")]
    Pack(#[from] PackError),

    /// Replay verification error.
    #[error("replay error: {0}")]
    Replay(#[from] ReplayError),

    /// Content address not present in the store.
    #[error("content not found: {0}")]
    NotFound(String),
}

/// Result type for fabric operations.
pub type Result<T> = std::result::Result<T, FabricError>;
