//! # Reach Fabric Testkit
//!
//! Testing utilities for the Reach fabric.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Canonical JSON and Merkle cases with fixed expected hashes
//! - **Generators**: Proptest strategies for JSON values, manifests, and event logs
//! - **Fixtures**: Sample manifests and NDJSON logs for integration tests
//!
//! ## Golden Vectors
//!
//! Any implementation of the fabric must reproduce these hashes byte for byte:
//!
//! ```rust
//! use reach_fabric_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, hex) in verify_all_vectors() {
//!     assert!(ok, "{name}: {hex}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use reach_fabric_testkit::generators::{manifest_from_params, ManifestParams};
//!
//! proptest! {
//!     #[test]
//!     fn generated_manifests_lint(params: ManifestParams) {
//!         let manifest = manifest_from_params(&params);
//!         prop_assert!(reach_fabric::pack::lint_manifest(&manifest, &Default::default()).valid);
//!     }
//! }
//! ```

use std::sync::Once;

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_log, sample_manifest, sample_ndjson, PackFixture};
pub use generators::{event_log, json_value, manifest_from_params, ManifestParams};
pub use vectors::{canonical_vectors, merkle_vectors, verify_all_vectors, CanonicalVector, MerkleVector};

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness's captured writer.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}
