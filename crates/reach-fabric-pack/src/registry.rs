//! Content-addressed registry of linted packs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use reach_fabric_core::{sort_strings, Sha256Hash};

use crate::lint::LintResult;

/// Registry of valid lint results keyed by their `hash`.
///
/// Caller-owned; construct one per process or test.
#[derive(Debug, Default)]
pub struct PackRegistry {
    packs: RwLock<HashMap<String, Arc<LintResult>>>,
}

impl PackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a valid result. Invalid or unhashed results are refused.
    pub fn register(&self, result: LintResult) -> Option<Sha256Hash> {
        if !result.valid {
            return None;
        }
        let hash = result.hash?;
        let mut packs = self.packs.write().unwrap_or_else(|e| e.into_inner());
        packs.insert(hash.to_hex(), Arc::new(result));
        tracing::debug!(cid = %hash, "registered pack");
        Some(hash)
    }

    pub fn get(&self, cid: &str) -> Option<Arc<LintResult>> {
        let packs = self.packs.read().unwrap_or_else(|e| e.into_inner());
        packs.get(cid).cloned()
    }

    /// Registered content ids, sorted.
    pub fn list_cids(&self) -> Vec<String> {
        let packs = self.packs.read().unwrap_or_else(|e| e.into_inner());
        let cids: Vec<String> = packs.keys().cloned().collect();
        sort_strings(&cids)
    }

    pub fn len(&self) -> usize {
        self.packs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
