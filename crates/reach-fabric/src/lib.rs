//! # Reach Fabric
//!
//! The unified API for deterministic execution: canonical hashing, pack
//! integrity, and replay verification.
//!
//! ## Overview
//!
//! The fabric guarantees that the same logical input produces the same bytes
//! and the same hashes on every machine and in every implementation:
//!
//! - **Canonical JSON**: one serialization per logical value
//! - **Merkle integrity**: tamper-evident roots and partial proofs
//! - **Pack lint**: schema, permission, and DAG checks feeding the integrity hash
//! - **Replay fingerprints**: a run id and its event log bound into one hash
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reach_fabric::{Fabric, FabricConfig};
//!
//! let fabric = Fabric::new(FabricConfig::default());
//! let result = fabric.lint(br#"{"specVersion":"1.0","metadata":{"id":"demo"}}"#);
//! assert!(result.valid);
//! println!("merkle root: {:?}", result.merkle_root);
//! ```
//!
//! ## Re-exports
//!
//! - `reach_fabric::core` - Canonical values, ordering, PRNG, hashing
//! - `reach_fabric::merkle` - Trees, proofs, content-addressed store
//! - `reach_fabric::pack` - Manifest lint and integrity
//! - `reach_fabric::replay` - Event logs and fingerprints

pub mod api;
pub mod error;
pub mod fabric;

// Re-export component crates
pub use reach_fabric_core as core;
pub use reach_fabric_merkle as merkle;
pub use reach_fabric_pack as pack;
pub use reach_fabric_replay as replay;

pub use api::{
    build_merkle_tree, canonicalize, compute_pack_integrity, compute_run_fingerprint, equal,
    get_proof, lint, seed, serialize, verify_proof, verify_replay,
};
pub use error::{FabricError, Result};
pub use fabric::{Fabric, FabricConfig};

// Re-export commonly used types
pub use reach_fabric_core::{CanonicalValue, DeterministicMap, Rng, Sha256Hash};
pub use reach_fabric_merkle::{ContentAddressedStore, MerkleProof, MerkleTree};
pub use reach_fabric_pack::{LintConfig, LintResult, PackIntegrity, PackManifest};
pub use reach_fabric_replay::{Event, ReplayConfig, ReplayVerdict};
