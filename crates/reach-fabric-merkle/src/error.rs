//! Error types for Merkle operations.

use thiserror::Error;

/// Errors from building trees and generating proofs.
#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("cannot build a Merkle tree from zero leaves")]
    EmptyTree,

    #[error("leaf index {index} out of range [0, {leaf_count})")]
    IndexOutOfRange { index: usize, leaf_count: usize },

    #[error("proof is malformed: {0}")]
    MalformedProof(String),

    #[error(transparent)]
    Core(#[from] reach_fabric_core::CoreError),
}

/// Result type for Merkle operations.
pub type Result<T> = std::result::Result<T, MerkleError>;
