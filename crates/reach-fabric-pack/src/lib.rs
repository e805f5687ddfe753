//! # Reach Fabric Pack
//!
//! Validation and integrity for pack manifests.
//!
//! ## Overview
//!
//! A pack manifest declares tools, permissions, and an execution graph. This
//! crate lints it, binds its fields into a five-leaf Merkle tree, and computes
//! the signature basis used to detect edits after sealing.
//!
//! ## Key Types
//!
//! - [`PackManifest`] - Parsed manifest
//! - [`LintResult`] - Errors, warnings, hash and Merkle root
//! - [`PackIntegrity`] - Integrity tree over the manifest
//! - [`PackRegistry`] - Caller-owned store of valid lint results

pub mod error;
pub mod integrity;
pub mod lint;
pub mod manifest;
pub mod registry;
pub mod signature;

pub use error::{PackError, Result};
pub use integrity::{
    compute_pack_integrity, content_address, integrity_leaves, manifest_integrity,
    verify_merkle_proof, PackIntegrity, PackIntegrityJson, GRAPH_LEAF_INDEX,
    INTEGRITY_LEAF_COUNT,
};
pub use lint::{lint, lint_manifest, lint_with_merkle, LintConfig, LintResult, CYCLE_ERROR};
pub use manifest::{canonical_graph_bytes, Edge, ExecutionGraph, Metadata, Node, PackManifest};
pub use registry::PackRegistry;
pub use signature::{
    compute_signature_hash, compute_signature_hash_bytes, compute_signature_hash_value, seal,
    seal_bytes, signature_basis, verify_signature_hash, verify_signature_hash_bytes,
};
