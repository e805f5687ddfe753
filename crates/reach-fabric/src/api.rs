//! Library surface consumed by the CLI and runner layers.
//!
//! Thin free functions over the component crates, using default policy.
//! Use [`crate::Fabric`] when thresholds or replay policy need to differ.

use serde_json::Value;

use reach_fabric_core::{CanonicalValue, Rng, Sha256Hash};
use reach_fabric_merkle::{MerkleProof, MerkleTree};
use reach_fabric_pack::{LintConfig, LintResult, PackIntegrity, PackManifest};
use reach_fabric_replay::{Event, ReplayConfig, ReplayVerdict};

use crate::error::Result;

/// Lint manifest bytes with default thresholds.
pub fn lint(manifest: &[u8]) -> LintResult {
    reach_fabric_pack::lint(manifest, &LintConfig::default())
}

/// Bind a manifest and its canonical graph bytes into an integrity tree.
pub fn compute_pack_integrity(manifest: &PackManifest, graph_bytes: &[u8]) -> Result<PackIntegrity> {
    Ok(reach_fabric_pack::compute_pack_integrity(manifest, graph_bytes)?)
}

pub fn build_merkle_tree<L: AsRef<[u8]>>(leaves: &[L]) -> Result<MerkleTree> {
    Ok(MerkleTree::build(leaves)?)
}

pub fn get_proof(tree: &MerkleTree, index: usize) -> Result<MerkleProof> {
    Ok(tree.proof(index)?)
}

pub fn verify_proof(proof: &MerkleProof, root: &Sha256Hash) -> bool {
    reach_fabric_merkle::verify(proof, root)
}

/// Fingerprint a run under the default replay policy.
pub fn compute_run_fingerprint(run_id: &str, log: &[Event]) -> Result<Sha256Hash> {
    Ok(reach_fabric_replay::compute_run_fingerprint(
        run_id,
        log,
        &ReplayConfig::default(),
    )?)
}

pub fn verify_replay(stored: &Sha256Hash, recomputed: &Sha256Hash) -> ReplayVerdict {
    reach_fabric_replay::verify_replay(stored, recomputed)
}

pub fn seed(seed: &str) -> Rng {
    Rng::seed(seed)
}

pub fn canonicalize(value: &Value) -> CanonicalValue {
    reach_fabric_core::canonicalize(value)
}

pub fn serialize(value: &CanonicalValue) -> String {
    reach_fabric_core::serialize(value)
}

pub fn equal(a: &Value, b: &Value) -> bool {
    reach_fabric_core::equal(a, b)
}
