//! Deterministic ordering helpers.
//!
//! All string comparison here is by Unicode code point, never by locale.
//! Sorting is stable and returns a new vector; inputs are not mutated.

use std::cmp::Ordering;
use std::collections::HashMap;

/// A boxed comparator.
pub type Comparator<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + 'a>;

/// Compare two strings by code point.
///
/// UTF-8 byte order and code point order coincide, so this is plain `str::cmp`.
pub fn compare(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Compare two numbers. `NaN` compares via `total_cmp` so the order stays total.
pub fn compare_numbers(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// Comparator on a string-valued key.
pub fn by_key<'a, T, F>(key: F) -> Comparator<'a, T>
where
    F: Fn(&T) -> &str + 'a,
{
    Box::new(move |a, b| compare(key(a), key(b)))
}

/// Comparator on a numeric key.
pub fn by_numeric_key<'a, T, F>(key: F) -> Comparator<'a, T>
where
    F: Fn(&T) -> f64 + 'a,
{
    Box::new(move |a, b| compare_numbers(key(a), key(b)))
}

/// First comparator that reports a difference wins.
pub fn chain<'a, T: 'a>(comparators: Vec<Comparator<'a, T>>) -> Comparator<'a, T> {
    Box::new(move |a, b| {
        comparators
            .iter()
            .map(|cmp| cmp(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    })
}

/// Sorted copy of a string slice.
pub fn sort_strings<S: AsRef<str> + Clone>(items: &[S]) -> Vec<S> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| compare(a.as_ref(), b.as_ref()));
    out
}

/// Stable sorted copy using a string key.
pub fn sort_by_key<T: Clone, F>(items: &[T], key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut out = items.to_vec();
    out.sort_by(|a, b| compare(key(a), key(b)));
    out
}

/// Stable sorted copy using a numeric key.
pub fn sort_by_numeric_key<T: Clone, F>(items: &[T], key: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    let mut out = items.to_vec();
    out.sort_by(|a, b| compare_numbers(key(a), key(b)));
    out
}

/// Stable sorted copy using an arbitrary comparator.
pub fn sort_with<T: Clone>(items: &[T], cmp: &Comparator<'_, T>) -> Vec<T> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| cmp(a, b));
    out
}

/// Keys of a map in code point order.
pub fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort_by(|a, b| compare(a, b));
    keys
}

/// Entries of a map in key order.
pub fn sorted_entries<V>(map: &HashMap<String, V>) -> Vec<(&str, &V)> {
    let mut entries: Vec<(&str, &V)> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
    entries.sort_by(|a, b| compare(a.0, b.0));
    entries
}
