//! Binds a manifest into a five-leaf Merkle tree.
//!
//! Leaf layout, fixed:
//!
//! | index | content                                   |
//! |-------|-------------------------------------------|
//! | 0     | `"<id>:<version>:<name>"`                 |
//! | 1     | canonical JSON array of declared tools    |
//! | 2     | canonical JSON array of declared permissions |
//! | 3     | canonical execution graph bytes           |
//! | 4     | `"true"` or `"false"` (deterministic flag) |

use serde::{Deserialize, Serialize};

use reach_fabric_core::{canonical_bytes_of, Sha256Hash};
use reach_fabric_merkle::{verify, MerkleProof, MerkleTree, MerkleTreeJson};

use crate::error::{PackError, Result};
use crate::manifest::PackManifest;

/// Number of leaves in every integrity tree.
pub const INTEGRITY_LEAF_COUNT: usize = 5;

/// Index of the execution graph leaf.
pub const GRAPH_LEAF_INDEX: usize = 3;

/// Merkle integrity for one pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackIntegrity {
    pub pack_id: String,
    pub merkle_root: Sha256Hash,
    pub tree: MerkleTree,
}

/// Serialized form of [`PackIntegrity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackIntegrityJson {
    pub pack_id: String,
    pub merkle_root: String,
    pub tree: MerkleTreeJson,
}

impl Serialize for PackIntegrity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        PackIntegrityJson {
            pack_id: self.pack_id.clone(),
            merkle_root: self.merkle_root.to_hex(),
            tree: self.tree.to_json(true),
        }
        .serialize(serializer)
    }
}

impl PackIntegrity {
    /// Check that `leaf_bytes` is the leaf at `leaf_index` under the stored root.
    pub fn verify_integrity(&self, leaf_index: usize, leaf_bytes: &[u8]) -> bool {
        let proof = match self.tree.proof(leaf_index) {
            Ok(proof) => proof,
            Err(_) => return false,
        };
        proof.leaf_hash == Sha256Hash::hash(leaf_bytes) && verify(&proof, &self.merkle_root)
    }

    /// Proof for one of the five leaves.
    pub fn proof(&self, leaf_index: usize) -> Result<MerkleProof> {
        Ok(self.tree.proof(leaf_index)?)
    }

    pub fn merkle_root_hex(&self) -> String {
        self.merkle_root.to_hex()
    }
}

/// The five leaf byte strings for a manifest, given its canonical graph bytes.
pub fn integrity_leaves(manifest: &PackManifest, graph_bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    let meta = &manifest.metadata;
    Ok(vec![
        format!("{}:{}:{}", meta.id, meta.version, meta.name).into_bytes(),
        canonical_bytes_of(&manifest.declared_tools)?,
        canonical_bytes_of(&manifest.declared_permissions)?,
        graph_bytes.to_vec(),
        manifest.deterministic.to_string().into_bytes(),
    ])
}

/// Build the integrity tree for a manifest.
pub fn compute_pack_integrity(manifest: &PackManifest, graph_bytes: &[u8]) -> Result<PackIntegrity> {
    let leaves = integrity_leaves(manifest, graph_bytes)?;
    let tree = MerkleTree::build(&leaves)?;
    Ok(PackIntegrity {
        pack_id: manifest.metadata.id.clone(),
        merkle_root: tree.root(),
        tree,
    })
}

/// Build the integrity tree, deriving graph bytes from the manifest.
pub fn manifest_integrity(manifest: &PackManifest) -> Result<PackIntegrity> {
    let graph_bytes = manifest.execution_graph.canonical_bytes()?;
    compute_pack_integrity(manifest, &graph_bytes)
}

/// The content address of a pack: its integrity Merkle root.
pub fn content_address(manifest: &PackManifest) -> Result<Sha256Hash> {
    Ok(manifest_integrity(manifest)?.merkle_root)
}

/// Check a caller-supplied proof for `leaf_index` against the recomputed tree.
///
/// The proof must name the same leaf, carry the same leaf hash, and resolve
/// to the recomputed root.
pub fn verify_merkle_proof(
    manifest: &PackManifest,
    leaf_index: usize,
    proof: &MerkleProof,
) -> Result<bool> {
    if leaf_index >= INTEGRITY_LEAF_COUNT {
        return Err(PackError::LeafIndexOutOfRange {
            index: leaf_index,
            leaf_count: INTEGRITY_LEAF_COUNT,
        });
    }
    let integrity = manifest_integrity(manifest)?;
    let expected = integrity.proof(leaf_index)?;
    Ok(proof.leaf_index == leaf_index
        && proof.leaf_hash == expected.leaf_hash
        && verify(proof, &integrity.merkle_root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Edge, ExecutionGraph, Metadata, Node};

    fn manifest() -> PackManifest {
        PackManifest {
            metadata: Metadata {
                id: "test-pack".into(),
                version: "1.0.0".into(),
                name: "Test Pack".into(),
                description: "A test pack".into(),
            },
            spec_version: Some("1.0".into()),
            declared_tools: vec!["tool1".into(), "tool2".into()],
            declared_permissions: vec!["perm1".into()],
            execution_graph: ExecutionGraph {
                nodes: vec![Node::new("n1", "Action"), Node::new("n2", "Condition")],
                edges: vec![Edge::new("n1", "n2")],
            },
            deterministic: true,
            signature_hash: None,
        }
    }

    #[test]
    fn test_leaf_layout() {
        let m = manifest();
        let graph = m.execution_graph.canonical_bytes().unwrap();
        let leaves = integrity_leaves(&m, &graph).unwrap();
        assert_eq!(leaves.len(), INTEGRITY_LEAF_COUNT);
        assert_eq!(leaves[0], b"test-pack:1.0.0:Test Pack");
        assert_eq!(leaves[1], br#"["tool1","tool2"]"#);
        assert_eq!(leaves[2], br#"["perm1"]"#);
        assert_eq!(leaves[GRAPH_LEAF_INDEX], graph);
        assert_eq!(leaves[4], b"true");
    }

    #[test]
    fn test_integrity_is_reproducible() {
        let a = manifest_integrity(&manifest()).unwrap();
        let b = manifest_integrity(&manifest()).unwrap();
        assert_eq!(a.merkle_root, b.merkle_root);
        assert_eq!(a.pack_id, "test-pack");
    }

    #[test]
    fn test_verify_integrity_checks_leaf_bytes() {
        let m = manifest();
        let integrity = manifest_integrity(&m).unwrap();
        assert!(integrity.verify_integrity(4, b"true"));
        assert!(!integrity.verify_integrity(4, b"false"));
        assert!(integrity.verify_integrity(0, b"test-pack:1.0.0:Test Pack"));
        assert!(!integrity.verify_integrity(5, b"true"));
    }

    #[test]
    fn test_any_field_change_moves_root() {
        let base = content_address(&manifest()).unwrap();

        let mut m = manifest();
        m.deterministic = false;
        assert_ne!(content_address(&m).unwrap(), base);

        let mut m = manifest();
        m.declared_tools.reverse();
        assert_ne!(content_address(&m).unwrap(), base);

        let mut m = manifest();
        m.execution_graph.edges.clear();
        assert_ne!(content_address(&m).unwrap(), base);

        // Description is not bound into the tree.
        let mut m = manifest();
        m.metadata.description = "changed".into();
        assert_eq!(content_address(&m).unwrap(), base);
    }

    #[test]
    fn test_verify_merkle_proof() {
        let m = manifest();
        let proof = manifest_integrity(&m).unwrap().proof(GRAPH_LEAF_INDEX).unwrap();
        assert!(verify_merkle_proof(&m, GRAPH_LEAF_INDEX, &proof).unwrap());
        assert!(!verify_merkle_proof(&m, 2, &proof).unwrap());

        let mut changed = m.clone();
        changed.execution_graph.nodes.push(Node::new("n3", "Action"));
        assert!(!verify_merkle_proof(&changed, GRAPH_LEAF_INDEX, &proof).unwrap());

        assert!(matches!(
            verify_merkle_proof(&m, 9, &proof),
            Err(PackError::LeafIndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn test_integrity_json_projection() {
        let integrity = manifest_integrity(&manifest()).unwrap();
        let json = serde_json::to_value(&integrity).unwrap();
        assert_eq!(json["packId"], "test-pack");
        assert_eq!(json["merkleRoot"], integrity.merkle_root_hex());
        assert_eq!(json["tree"]["leaf_count"], 5);
    }
}
