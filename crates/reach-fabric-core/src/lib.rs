//! # Reach Fabric Core
//!
//! Pure determinism primitives for the Reach execution fabric.
//!
//! Nothing in this crate reads the clock, touches the filesystem, or talks to
//! the network. Streaming hashing accepts any `AsyncRead` the caller supplies.
//!
//! ## Key Types
//!
//! - [`CanonicalValue`] - A JSON value normalized for hashing
//! - [`Sha256Hash`] - 32-byte SHA-256 digest with hex helpers
//! - [`StreamingHasher`] - Incremental SHA-256
//! - [`DeterministicMap`] - String-keyed map with sorted traversal
//! - [`Rng`] - Seeded Mulberry32 generator
//!
//! ## Canonicalization
//!
//! Every fingerprint in the fabric is `sha256(canonical_json(value))`. See
//! the [`canonical`] module for the exact encoding rules.

pub mod canonical;
pub mod diff;
pub mod error;
pub mod hash;
pub mod map;
pub mod ordering;
pub mod prng;

pub use canonical::{
    canonical_bytes_of, canonical_hash, canonical_hash_of, canonical_json_bytes, canonicalize,
    canonicalize_serializable, equal, serialize, to_canonical_json, CanonicalNumber,
    CanonicalValue, MAX_SAFE_INTEGER,
};
pub use diff::{diff_values, DiffField, DiffReason};
pub use error::{CoreError, Result};
pub use hash::{
    combine_hashes, hash_bytes, hash_stream, hash_stream_with_cancel, hash_string, Sha256Hash,
    StreamConfig, StreamingHasher, HASH_ALGORITHM,
};
pub use map::DeterministicMap;
pub use ordering::{
    by_key, by_numeric_key, chain, compare, compare_numbers, sort_by_key, sort_by_numeric_key,
    sort_strings, sort_with, sorted_entries, sorted_keys, Comparator,
};
pub use prng::{hash_seed, seed, Rng};
