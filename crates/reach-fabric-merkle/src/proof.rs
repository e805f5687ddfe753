//! Inclusion proofs.

use serde::{Deserialize, Serialize};

use reach_fabric_core::Sha256Hash;

use crate::error::{MerkleError, Result};

/// Which side a sibling occupies at its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Wire encoding: 0 = left, 1 = right.
    pub fn as_index(self) -> u8 {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Side::Left),
            1 => Some(Side::Right),
            _ => None,
        }
    }
}

/// A Merkle inclusion proof, ordered leaf to root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    pub leaf_index: usize,
    pub leaf_hash: Sha256Hash,
    pub sibling_path: Vec<(Sha256Hash, Side)>,
}

/// JSON projection of a proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProofJson {
    pub index: usize,
    pub leaf_hash: String,
    pub proof_path: Vec<String>,
    pub proof_index: Vec<u8>,
}

impl MerkleProof {
    /// Recompute the root this proof commits to.
    pub fn compute_root(&self) -> Sha256Hash {
        self.sibling_path
            .iter()
            .fold(self.leaf_hash, |current, (sibling, side)| match side {
                Side::Left => Sha256Hash::hash_pair(sibling, &current),
                Side::Right => Sha256Hash::hash_pair(&current, sibling),
            })
    }

    pub fn to_json(&self) -> MerkleProofJson {
        MerkleProofJson {
            index: self.leaf_index,
            leaf_hash: self.leaf_hash.to_hex(),
            proof_path: self.sibling_path.iter().map(|(h, _)| h.to_hex()).collect(),
            proof_index: self.sibling_path.iter().map(|(_, s)| s.as_index()).collect(),
        }
    }

    pub fn from_json(json: &MerkleProofJson) -> Result<Self> {
        if json.proof_path.len() != json.proof_index.len() {
            return Err(MerkleError::MalformedProof(format!(
                "{} path entries but {} side markers",
                json.proof_path.len(),
                json.proof_index.len()
            )));
        }
        let sibling_path = json
            .proof_path
            .iter()
            .zip(&json.proof_index)
            .map(|(hex, idx)| -> Result<(Sha256Hash, Side)> {
                let side = Side::from_index(*idx).ok_or_else(|| {
                    MerkleError::MalformedProof(format!("invalid side marker {idx}"))
                })?;
                Ok((Sha256Hash::from_hex(hex)?, side))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            leaf_index: json.index,
            leaf_hash: Sha256Hash::from_hex(&json.leaf_hash)?,
            sibling_path,
        })
    }
}

impl Serialize for MerkleProof {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MerkleProof {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = MerkleProofJson::deserialize(deserializer)?;
        Self::from_json(&json).map_err(serde::de::Error::custom)
    }
}

/// Check a proof against a root. Never panics; a bad proof is just `false`.
pub fn verify(proof: &MerkleProof, root: &Sha256Hash) -> bool {
    proof.compute_root() == *root
}

/// Check a proof against a hex root. Malformed hex verifies `false`.
pub fn verify_proof_hex(proof: &MerkleProof, root_hex: &str) -> bool {
    match Sha256Hash::from_hex(root_hex) {
        Ok(root) => verify(proof, &root),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MerkleTree;
    use proptest::prelude::*;

    fn tree(n: usize) -> MerkleTree {
        let leaves: Vec<String> = (0..n).map(|i| format!("item {i}")).collect();
        MerkleTree::build(&leaves).unwrap()
    }

    #[test]
    fn test_side_markers() {
        let t = tree(4);
        let p0 = t.proof(0).unwrap();
        let p3 = t.proof(3).unwrap();
        assert_eq!(p0.sibling_path[0].1, Side::Right);
        assert_eq!(p3.sibling_path[0].1, Side::Left);
        assert_eq!(p3.sibling_path[1].1, Side::Left);
    }

    #[test]
    fn test_higher_levels_use_real_siblings() {
        let t = tree(4);
        let p0 = t.proof(0).unwrap();
        let h2 = Sha256Hash::hash(b"item 2");
        let h3 = Sha256Hash::hash(b"item 3");
        assert_eq!(p0.sibling_path[1].0, Sha256Hash::hash_pair(&h2, &h3));
        assert_ne!(p0.sibling_path[1].0, t.root());
    }

    #[test]
    fn test_tampered_proof_fails() {
        let t = tree(5);
        let mut p = t.proof(2).unwrap();
        p.leaf_hash = Sha256Hash::hash(b"forged");
        assert!(!verify(&p, &t.root()));

        let mut p = t.proof(2).unwrap();
        p.sibling_path[0].1 = Side::Left;
        assert!(!verify(&p, &t.root()));
    }

    #[test]
    fn test_changed_leaf_invalidates_old_proof() {
        let old = MerkleTree::build(&[b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]).unwrap();
        let new = MerkleTree::build(&[b"a".to_vec(), b"B".to_vec(), b"c".to_vec()]).unwrap();
        assert_ne!(old.root(), new.root());
        let proof = old.proof(1).unwrap();
        assert!(!verify(&proof, &new.root()));
    }

    #[test]
    fn test_verify_proof_hex() {
        let t = tree(3);
        let p = t.proof(1).unwrap();
        assert!(verify_proof_hex(&p, &t.root_hex()));
        assert!(!verify_proof_hex(&p, "not hex"));
        assert!(!verify_proof_hex(&p, "abcd"));
    }

    #[test]
    fn test_json_projection() {
        let t = tree(3);
        let p = t.proof(2).unwrap();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["index"], 2);
        assert_eq!(json["proof_index"], serde_json::json!([1, 0]));
        let back: MerkleProof = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_from_json_rejects_mismatched_lengths() {
        let json = MerkleProofJson {
            index: 0,
            leaf_hash: Sha256Hash::hash(b"x").to_hex(),
            proof_path: vec![Sha256Hash::hash(b"y").to_hex()],
            proof_index: vec![],
        };
        assert!(matches!(
            MerkleProof::from_json(&json),
            Err(MerkleError::MalformedProof(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_membership(leaves in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 1..40)) {
            let t = MerkleTree::build(&leaves).unwrap();
            for i in 0..leaves.len() {
                let p = t.proof(i).unwrap();
                prop_assert!(verify(&p, &t.root()));
            }
        }
    }
}
