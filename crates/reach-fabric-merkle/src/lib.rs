//! # Reach Fabric Merkle
//!
//! Tamper-evident integrity over ordered byte leaves.
//!
//! ## Overview
//!
//! - Leaf hash is `sha256(leaf)`; parent hash is `sha256(left || right)`
//! - An odd node at the end of a level is paired with itself
//! - Proofs list `(sibling, side)` pairs from leaf to root
//! - Verification never panics; any bad input just fails to verify
//!
//! ## Key Types
//!
//! - [`MerkleTree`] - Tree with every level retained
//! - [`MerkleProof`] - Inclusion proof
//! - [`ContentAddressedStore`] - `hex(sha256(bytes))`-keyed byte store

pub mod error;
pub mod proof;
pub mod store;
pub mod tree;

pub use error::{MerkleError, Result};
pub use proof::{verify, verify_proof_hex, MerkleProof, MerkleProofJson, Side};
pub use store::{content_address, ContentAddressedStore};
pub use tree::{MerkleTree, MerkleTreeJson};
