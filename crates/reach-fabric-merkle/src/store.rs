//! Content-addressed storage.
//!
//! Addresses are `hex(sha256(bytes))`, so identical content always lands at
//! the same key. The store is in-memory and thread-safe via `RwLock`.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;

use reach_fabric_core::{sort_strings, Sha256Hash};

use crate::error::Result;
use crate::tree::MerkleTree;

/// Content address of some bytes.
pub fn content_address(data: &[u8]) -> String {
    Sha256Hash::hash(data).to_hex()
}

/// In-memory content-addressed store.
///
/// Owned by the caller; there is no process-wide instance.
#[derive(Debug, Default)]
pub struct ContentAddressedStore {
    data: RwLock<HashMap<String, Bytes>>,
}

impl ContentAddressedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Bytes>> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Bytes>> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Store bytes and return their address. Re-storing is a no-op.
    pub fn store(&self, data: impl Into<Bytes>) -> String {
        let data = data.into();
        let address = content_address(&data);
        let mut map = self.write();
        if !map.contains_key(&address) {
            tracing::debug!(address = %address, size = data.len(), "stored content");
            map.insert(address.clone(), data);
        }
        address
    }

    /// Store every item and return the Merkle root over them, in order.
    ///
    /// Each item stays individually retrievable by its own address.
    pub fn store_batch<I: AsRef<[u8]>>(&self, items: &[I]) -> Result<String> {
        let tree = MerkleTree::build(items)?;
        for item in items {
            self.store(Bytes::copy_from_slice(item.as_ref()));
        }
        tracing::debug!(items = items.len(), root = %tree.root_hex(), "stored batch");
        Ok(tree.root_hex())
    }

    pub fn retrieve(&self, address: &str) -> Option<Bytes> {
        self.read().get(address).cloned()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.read().contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All addresses in sorted order.
    pub fn addresses(&self) -> Vec<String> {
        let keys: Vec<String> = self.read().keys().cloned().collect();
        sort_strings(&keys)
    }
}
