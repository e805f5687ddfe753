//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use serde_json::json;

use reach_fabric::{Fabric, FabricConfig, Result};
use reach_fabric_core::Sha256Hash;
use reach_fabric_pack::{LintResult, PackRegistry};
use reach_fabric_replay::Event;

/// A small valid manifest that requests one system permission.
pub fn sample_manifest() -> String {
    json!({
        "metadata": {"id": "sample-pack", "version": "0.3.1", "name": "Sample", "description": "fixture"},
        "specVersion": "1.0",
        "declaredTools": ["http.get", "fs.read", "llm.complete"],
        "declaredPermissions": ["net:egress", "sys:exec"],
        "executionGraph": {
            "nodes": [
                {"id": "fetch", "type": "Action", "tool": "http.get"},
                {"id": "check", "type": "Condition"},
                {"id": "summarize", "type": "Action", "tool": "llm.complete", "inputs": {"maxTokens": 256}}
            ],
            "edges": [{"from": "fetch", "to": "check"}, {"from": "check", "to": "summarize"}]
        },
        "deterministic": true
    })
    .to_string()
}

/// A manifest whose graph loops back on itself.
pub fn cyclic_manifest() -> String {
    json!({
        "metadata": {"id": "loop"},
        "specVersion": "1.0",
        "executionGraph": {
            "nodes": [{"id": "a", "type": "Action"}, {"id": "b", "type": "Action"}],
            "edges": [{"from": "a", "to": "b"}, {"from": "b", "to": "a"}]
        }
    })
    .to_string()
}

/// NDJSON event log for `run-sample`. Contains one blank line.
pub fn sample_ndjson() -> &'static str {
    concat!(
        r#"{"type":"session.started","payload":{"sessionId":"s1","tenantId":"t1","status":"active","startedAt":"2024-01-01T00:00:00Z","members":["alice"]}}"#,
        "\n",
        r#"{"type":"tool.call","payload":{"tool":"http.get","args":{"url":"https://example.test"}}}"#,
        "\n\n",
        r#"{"type":"tool.result","payload":{"status":200},"schemaVersion":"1.0.0"}"#,
        "\n",
    )
}

/// The events of [`sample_ndjson`], built directly.
pub fn sample_log() -> Vec<Event> {
    vec![
        Event::new(
            "session.started",
            json!({
                "sessionId": "s1",
                "tenantId": "t1",
                "status": "active",
                "startedAt": "2024-01-01T00:00:00Z",
                "members": ["alice"]
            }),
        ),
        Event::new(
            "tool.call",
            json!({"tool": "http.get", "args": {"url": "https://example.test"}}),
        ),
        Event::new("tool.result", json!({"status": 200})).with_schema_version("1.0.0"),
    ]
}

/// A fabric plus a pack registry.
pub struct PackFixture {
    pub fabric: Fabric,
    pub registry: PackRegistry,
}

impl PackFixture {
    pub fn new() -> Self {
        Self::with_config(FabricConfig::default())
    }

    pub fn with_config(config: FabricConfig) -> Self {
        Self {
            fabric: Fabric::new(config),
            registry: PackRegistry::new(),
        }
    }

    /// Lint manifest text and register it if valid.
    pub fn lint_and_register(&self, manifest: &str) -> (LintResult, Option<Sha256Hash>) {
        let result = self.fabric.lint(manifest.as_bytes());
        let cid = self.registry.register(result.clone());
        (result, cid)
    }

    /// Fingerprint of [`sample_ndjson`] under this fixture's replay policy.
    pub fn sample_fingerprint(&self) -> Result<Sha256Hash> {
        self.fabric
            .fingerprint_ndjson("run-sample", sample_ndjson().as_bytes())
    }
}

impl Default for PackFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_test_tracing;

    #[test]
    fn test_sample_manifest_registers() {
        init_test_tracing();
        let fixture = PackFixture::new();
        let (result, cid) = fixture.lint_and_register(&sample_manifest());

        assert!(result.valid, "errors: {:?}", result.errors);
        assert_eq!(result.warnings, vec!["pack requests system permission: sys:exec"]);
        let cid = cid.unwrap();
        assert_eq!(Some(cid), result.hash);
        assert!(fixture.registry.get(&cid.to_hex()).is_some());
    }

    #[test]
    fn test_cyclic_manifest_refused() {
        let fixture = PackFixture::new();
        let (result, cid) = fixture.lint_and_register(&cyclic_manifest());

        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e == reach_fabric_pack::CYCLE_ERROR));
        assert!(cid.is_none());
        assert!(fixture.registry.is_empty());
    }

    #[test]
    fn test_sample_log_matches_ndjson() {
        let fixture = PackFixture::new();
        let direct = fixture.fabric.fingerprint("run-sample", &sample_log()).unwrap();
        assert_eq!(fixture.sample_fingerprint().unwrap(), direct);
        assert_ne!(direct, Sha256Hash::default());
    }

    #[tokio::test]
    async fn test_stream_hash_of_log() {
        let fixture = PackFixture::new();
        let hash = fixture
            .fabric
            .hash_stream(sample_ndjson().as_bytes())
            .await
            .unwrap();
        assert_eq!(hash, Sha256Hash::hash(sample_ndjson().as_bytes()));
    }
}
