//! End-to-end: lint, bind, seal, verify.

use reach_fabric_merkle::verify;
use reach_fabric_pack::{
    content_address, lint, lint_with_merkle, seal, verify_merkle_proof, verify_signature_hash,
    LintConfig, PackManifest, GRAPH_LEAF_INDEX,
};

const MANIFEST: &str = r#"{
    "metadata": {
        "id": "deploy-pack",
        "version": "2.1.0",
        "name": "Deploy",
        "description": "Rolls out a service"
    },
    "specVersion": "1.2",
    "declaredTools": ["kubectl.apply", "http.get"],
    "declaredPermissions": ["net:egress", "sys:exec"],
    "executionGraph": {
        "nodes": [
            {"id": "fetch", "type": "Action", "tool": "http.get", "inputs": {"url": "https://example.test", "retries": 3}},
            {"id": "check", "type": "Condition"},
            {"id": "apply", "type": "Action", "tool": "kubectl.apply"}
        ],
        "edges": [
            {"from": "fetch", "to": "check"},
            {"from": "check", "to": "apply"}
        ]
    },
    "deterministic": true
}"#;

#[test]
fn test_full_pipeline() {
    let config = LintConfig::default();
    let result = lint_with_merkle(MANIFEST.as_bytes(), &config);

    assert!(result.valid, "errors: {:?}", result.errors);
    assert_eq!(result.warnings, vec!["pack requests system permission: sys:exec"]);

    let root = result.merkle_root.unwrap();
    let proof = result.proof.clone().unwrap();
    assert_eq!(proof.leaf_index, GRAPH_LEAF_INDEX);
    assert!(verify(&proof, &root));

    let manifest = PackManifest::from_json_bytes(MANIFEST.as_bytes()).unwrap();
    assert_eq!(content_address(&manifest).unwrap(), root);
    assert!(verify_merkle_proof(&manifest, GRAPH_LEAF_INDEX, &proof).unwrap());

    let sealed = seal(&manifest).unwrap();
    verify_signature_hash(&sealed).unwrap();

    // Sealing does not move the integrity root.
    assert_eq!(content_address(&sealed).unwrap(), root);
}

#[test]
fn test_reformatted_manifest_has_same_identity() {
    let config = LintConfig::default();
    let value: serde_json::Value = serde_json::from_str(MANIFEST).unwrap();
    let compact = serde_json::to_vec(&value).unwrap();

    let a = lint(MANIFEST.as_bytes(), &config);
    let b = lint(&compact, &config);
    assert_eq!(a.hash, b.hash);
    assert_eq!(a.merkle_root, b.merkle_root);
}

#[test]
fn test_result_serializes_camel_case() {
    let result = lint(MANIFEST.as_bytes(), &LintConfig::default());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["valid"], true);
    assert!(json["merkleRoot"].is_string());
    assert_eq!(json["integrity"]["packId"], "deploy-pack");
    assert_eq!(json["proof"]["index"], 3);
}
