//! A string-keyed map with deterministic iteration.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::ordering::compare;

/// Map whose every traversal visits keys in code point order.
///
/// Lookups go through a hash map; ordering is applied on each traversal,
/// so insertion order never leaks out.
#[derive(Clone, PartialEq, Eq)]
pub struct DeterministicMap<V> {
    inner: HashMap<String, V>,
}

impl<V> DeterministicMap<V> {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.inner.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    /// Insert or replace. Returns the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.inner.insert(key.into(), value)
    }

    pub fn has(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Remove a key. Returns whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.inner.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Keys in code point order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.inner.keys().map(String::as_str).collect();
        keys.sort_by(|a, b| compare(a, b));
        keys
    }

    /// Values in key order.
    pub fn values(&self) -> Vec<&V> {
        self.entries().into_iter().map(|(_, v)| v).collect()
    }

    /// Entries in key order.
    pub fn entries(&self) -> Vec<(&str, &V)> {
        let mut entries: Vec<(&str, &V)> =
            self.inner.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| compare(a.0, b.0));
        entries
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> std::vec::IntoIter<(&str, &V)> {
        self.entries().into_iter()
    }

    /// Visit every entry in key order.
    pub fn for_each<F: FnMut(&str, &V)>(&self, mut f: F) {
        for (k, v) in self.entries() {
            f(k, v);
        }
    }

    /// Snapshot as an ordered map.
    pub fn to_object(&self) -> BTreeMap<String, V>
    where
        V: Clone,
    {
        self.inner
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn from_object(object: BTreeMap<String, V>) -> Self {
        object.into_iter().collect()
    }
}

impl<V> Default for DeterministicMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for DeterministicMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for DeterministicMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<'a, V> IntoIterator for &'a DeterministicMap<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = std::vec::IntoIter<(&'a str, &'a V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: Serialize> Serialize for DeterministicMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.entries() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for DeterministicMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let inner = HashMap::<String, V>::deserialize(deserializer)?;
        Ok(Self { inner })
    }
}
