//! The Fabric: configured entry point for the CLI and runner layers.
//!
//! A `Fabric` owns its configuration and its content-addressed store. There
//! is no global instance; callers construct one and pass it where needed.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

use reach_fabric_core::{hash_stream, Sha256Hash, StreamConfig};
use reach_fabric_merkle::ContentAddressedStore;
use reach_fabric_pack::{LintConfig, LintResult, PackIntegrity, PackManifest};
use reach_fabric_replay::{Event, ReplayConfig, ReplayReport, ReplayVerdict};

use crate::error::{FabricError, Result};

/// Configuration for the Fabric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabricConfig {
    /// Manifest lint thresholds.
    pub lint: LintConfig,
    /// Replay compatibility policy.
    pub replay: ReplayConfig,
    /// Stream hashing parameters.
    pub stream: StreamConfig,
}

/// Configured access to linting, integrity, storage, and replay.
pub struct Fabric {
    config: FabricConfig,
    store: Arc<ContentAddressedStore>,
}

impl Fabric {
    /// Create a fabric with a fresh, empty store.
    pub fn new(config: FabricConfig) -> Self {
        Self::with_store(config, Arc::new(ContentAddressedStore::new()))
    }

    /// Create a fabric over a caller-supplied store.
    pub fn with_store(config: FabricConfig, store: Arc<ContentAddressedStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &FabricConfig {
        &self.config
    }

    pub fn store(&self) -> &ContentAddressedStore {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Packs
    // ─────────────────────────────────────────────────────────────────────────

    /// Lint manifest bytes with the configured thresholds.
    pub fn lint(&self, manifest: &[u8]) -> LintResult {
        reach_fabric_pack::lint(manifest, &self.config.lint)
    }

    /// Lint and verify every integrity leaf.
    pub fn lint_with_merkle(&self, manifest: &[u8]) -> LintResult {
        reach_fabric_pack::lint_with_merkle(manifest, &self.config.lint)
    }

    /// Build the integrity tree for a parsed manifest.
    pub fn pack_integrity(&self, manifest: &PackManifest) -> Result<PackIntegrity> {
        Ok(reach_fabric_pack::manifest_integrity(manifest)?)
    }

    /// Store the five integrity leaves of a manifest.
    ///
    /// Returns the batch root, which equals the manifest's integrity root.
    pub fn store_pack(&self, manifest: &PackManifest) -> Result<Sha256Hash> {
        let graph = manifest.execution_graph.canonical_bytes()?;
        let leaves = reach_fabric_pack::integrity_leaves(manifest, &graph)?;
        let root = self.store.store_batch(&leaves)?;
        tracing::debug!(pack = %manifest.metadata.id, root = %root, "stored pack leaves");
        Ok(Sha256Hash::from_hex(&root)?)
    }

    /// Seal manifest bytes, signing every field they contain.
    pub fn seal_pack(&self, manifest: &[u8]) -> Result<Vec<u8>> {
        Ok(reach_fabric_pack::seal_bytes(manifest)?)
    }

    /// Check the `signatureHash` of manifest bytes against their content.
    pub fn verify_pack_signature(&self, manifest: &[u8]) -> Result<()> {
        Ok(reach_fabric_pack::verify_signature_hash_bytes(manifest)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content
    // ─────────────────────────────────────────────────────────────────────────

    /// Store bytes and return their address.
    pub fn put(&self, data: impl Into<Bytes>) -> String {
        self.store.store(data)
    }

    /// Fetch bytes by address.
    pub fn get(&self, address: &str) -> Result<Bytes> {
        self.store
            .retrieve(address)
            .ok_or_else(|| FabricError::NotFound(address.to_string()))
    }

    /// Hash a byte stream with the configured chunk size.
    pub async fn hash_stream<R>(&self, reader: R) -> Result<Sha256Hash>
    where
        R: AsyncRead + Unpin,
    {
        Ok(hash_stream(reader, &self.config.stream).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Replay
    // ─────────────────────────────────────────────────────────────────────────

    /// Fingerprint a run under the configured replay policy.
    pub fn fingerprint(&self, run_id: &str, log: &[Event]) -> Result<Sha256Hash> {
        Ok(reach_fabric_replay::compute_run_fingerprint(
            run_id,
            log,
            &self.config.replay,
        )?)
    }

    /// Recompute a run's fingerprint and compare it with a stored claim.
    pub fn verify_run(&self, run_id: &str, log: &[Event], stored: &Sha256Hash) -> Result<ReplayVerdict> {
        let recomputed = self.fingerprint(run_id, log)?;
        Ok(reach_fabric_replay::verify_replay(stored, &recomputed))
    }

    /// Compare a stored log with a replayed one and locate any divergence.
    pub fn compare_runs(&self, run_id: &str, stored: &[Event], replayed: &[Event]) -> Result<ReplayReport> {
        Ok(reach_fabric_replay::verify_replay_logs(
            run_id,
            stored,
            replayed,
            &self.config.replay,
        )?)
    }

    /// Parse an NDJSON log and fingerprint it.
    pub fn fingerprint_ndjson(&self, run_id: &str, ndjson: &[u8]) -> Result<Sha256Hash> {
        let log = reach_fabric_replay::parse_ndjson_log(ndjson)?;
        self.fingerprint(run_id, &log)
    }
}

impl Default for Fabric {
    fn default() -> Self {
        Self::new(FabricConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MANIFEST: &[u8] = br#"{"metadata":{"id":"p","version":"1.0.0","name":"P"},"specVersion":"1.0",
        "declaredTools":["t"],"executionGraph":{"nodes":[{"id":"a","type":"Action"}],"edges":[]},
        "deterministic":true}"#;

    #[test]
    fn test_store_pack_matches_lint_root() {
        let fabric = Fabric::default();
        let result = fabric.lint(MANIFEST);
        let manifest = PackManifest::from_json_bytes(MANIFEST).unwrap();
        let root = fabric.store_pack(&manifest).unwrap();
        assert_eq!(Some(root), result.merkle_root);
        assert_eq!(fabric.store().len(), 5);
        assert!(!fabric.get(&fabric.store().addresses()[0]).unwrap().is_empty());
    }

    #[test]
    fn test_seal_and_verify_pack() {
        let fabric = Fabric::default();
        let sealed = fabric.seal_pack(MANIFEST).unwrap();
        fabric.verify_pack_signature(&sealed).unwrap();
        assert!(fabric.lint(&sealed).valid);

        let mut doc: serde_json::Value = serde_json::from_slice(&sealed).unwrap();
        doc["metadata"]["owner"] = json!("someone-else");
        let tampered = serde_json::to_vec(&doc).unwrap();
        assert!(matches!(
            fabric.verify_pack_signature(&tampered),
            Err(FabricError::Pack(reach_fabric_pack::PackError::SignatureMismatch { .. }))
        ));
    }

    #[test]
    fn test_configured_thresholds_apply() {
        let mut config = FabricConfig::default();
        config.lint.max_tool_name_len = 0;
        let fabric = Fabric::new(config);
        assert!(!fabric.lint(MANIFEST).valid);
    }

    #[test]
    fn test_shared_store() {
        let store = Arc::new(ContentAddressedStore::new());
        let a = Fabric::with_store(FabricConfig::default(), Arc::clone(&store));
        let b = Fabric::with_store(FabricConfig::default(), Arc::clone(&store));
        let addr = a.put(&b"shared"[..]);
        assert_eq!(b.get(&addr).unwrap(), Bytes::from_static(b"shared"));
        assert!(matches!(b.get("nope"), Err(FabricError::NotFound(_))));
    }

    #[test]
    fn test_verify_run() {
        let fabric = Fabric::default();
        let log = vec![Event::new("tool.result", json!({"ok": true}))];
        let stored = fabric.fingerprint("run", &log).unwrap();
        assert!(fabric.verify_run("run", &log, &stored).unwrap().is_verified());

        let tampered = vec![Event::new("tool.result", json!({"ok": false}))];
        assert!(!fabric.verify_run("run", &tampered, &stored).unwrap().is_verified());
        let report = fabric.compare_runs("run", &log, &tampered).unwrap();
        assert_eq!(report.first_divergent_index, Some(0));
    }

    #[test]
    fn test_fingerprint_ndjson() {
        let fabric = Fabric::default();
        let ndjson = b"{\"type\":\"tool.result\",\"payload\":{\"ok\":true}}\n";
        let log = vec![Event::new("tool.result", json!({"ok": true}))];
        assert_eq!(
            fabric.fingerprint_ndjson("run", ndjson).unwrap(),
            fabric.fingerprint("run", &log).unwrap()
        );
    }

    #[tokio::test]
    async fn test_hash_stream_uses_config() {
        let mut config = FabricConfig::default();
        config.stream.chunk_size = 3;
        let fabric = Fabric::new(config);
        let hash = fabric.hash_stream(&b"chunked input"[..]).await.unwrap();
        assert_eq!(hash, Sha256Hash::hash(b"chunked input"));
    }

    #[test]
    fn test_config_from_json() {
        let config: FabricConfig =
            serde_json::from_str(r#"{"lint":{"max_graph_nodes":3},"stream":{"chunk_size":1024}}"#).unwrap();
        assert_eq!(config.lint.max_graph_nodes, 3);
        assert_eq!(config.stream.chunk_size, 1024);
        assert_eq!(config.replay, ReplayConfig::default());
    }
}
