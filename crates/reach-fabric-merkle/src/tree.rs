//! Bottom-up binary Merkle tree.
//!
//! Each level is built left to right in pairs. An odd node at the end of a
//! level is paired with itself. All levels are retained so that proofs carry
//! real sibling hashes at every height.

use serde::{Deserialize, Serialize};

use reach_fabric_core::Sha256Hash;

use crate::error::{MerkleError, Result};
use crate::proof::{MerkleProof, Side};

/// A Merkle tree over an ordered list of leaves.
#[derive(Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `levels[0]` holds the leaf hashes; the last level holds only the root.
    levels: Vec<Vec<Sha256Hash>>,
}

/// JSON projection of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleTreeJson {
    pub root_hash: String,
    pub leaf_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_hashes: Option<Vec<String>>,
}

impl MerkleTree {
    /// Build a tree by hashing each leaf.
    pub fn build<L: AsRef<[u8]>>(leaves: &[L]) -> Result<Self> {
        let hashes: Vec<Sha256Hash> = leaves
            .iter()
            .map(|leaf| Sha256Hash::hash(leaf.as_ref()))
            .collect();
        Self::from_leaf_hashes(hashes)
    }

    /// Build a tree from pre-computed leaf hashes.
    pub fn from_leaf_hashes(leaf_hashes: Vec<Sha256Hash>) -> Result<Self> {
        if leaf_hashes.is_empty() {
            return Err(MerkleError::EmptyTree);
        }

        let mut levels = vec![leaf_hashes];
        while let Some(current) = levels.last() {
            if current.len() <= 1 {
                break;
            }
            let parents: Vec<Sha256Hash> = current
                .chunks(2)
                .map(|pair| {
                    let left = &pair[0];
                    let right = pair.get(1).unwrap_or(left);
                    Sha256Hash::hash_pair(left, right)
                })
                .collect();
            levels.push(parents);
        }

        tracing::trace!(
            leaves = levels[0].len(),
            height = levels.len(),
            "built merkle tree"
        );
        Ok(Self { levels })
    }

    /// The apex hash.
    pub fn root(&self) -> Sha256Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_default()
    }

    /// Root as lowercase hex.
    pub fn root_hex(&self) -> String {
        self.root().to_hex()
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    pub fn leaf_hashes(&self) -> &[Sha256Hash] {
        &self.levels[0]
    }

    /// Number of levels, counting the leaf level and the root level.
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(MerkleError::IndexOutOfRange { index, leaf_count });
        }

        let mut path = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let (sibling_idx, side) = if idx % 2 == 0 {
                let right = if idx + 1 < level.len() { idx + 1 } else { idx };
                (right, Side::Right)
            } else {
                (idx - 1, Side::Left)
            };
            path.push((level[sibling_idx], side));
            idx /= 2;
        }

        Ok(MerkleProof {
            leaf_index: index,
            leaf_hash: self.levels[0][index],
            sibling_path: path,
        })
    }

    /// JSON projection; leaf hashes are included only when asked.
    pub fn to_json(&self, include_leaves: bool) -> MerkleTreeJson {
        MerkleTreeJson {
            root_hash: self.root_hex(),
            leaf_count: self.leaf_count(),
            leaf_hashes: include_leaves
                .then(|| self.leaf_hashes().iter().map(Sha256Hash::to_hex).collect()),
        }
    }
}

impl std::fmt::Debug for MerkleTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerkleTree")
            .field("root", &self.root())
            .field("leaf_count", &self.leaf_count())
            .field("height", &self.height())
            .finish()
    }
}
