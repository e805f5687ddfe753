//! Error types for pack handling.

use thiserror::Error;

use reach_fabric_core::CoreError;
use reach_fabric_merkle::MerkleError;

/// Pack errors.
///
/// Lint findings are never reported through this type; they are collected
/// into a `LintResult`.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("manifest has no signatureHash")]
    MissingSignatureHash,

    #[error("signature hash mismatch: expected {expected}, got {actual}")]
    SignatureMismatch { expected: String, actual: String },

    #[error("integrity leaf index {index} out of range [0, {leaf_count})")]
    LeafIndexOutOfRange { index: usize, leaf_count: usize },

    #[error(transparent)]
    Merkle(#[from] MerkleError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for pack operations.
pub type Result<T> = std::result::Result<T, PackError>;
