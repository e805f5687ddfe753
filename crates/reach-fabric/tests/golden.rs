//! Golden test vectors for cross-implementation verification.
//!
//! Every implementation of the fabric must produce identical:
//! - canonical JSON text and its SHA-256
//! - PRNG draws for a given seed
//! - Merkle roots for a given leaf list
//! - pack hash, integrity root, and signature hash
//! - run fingerprints

use reach_fabric::core::{canonical_hash, hash_seed, to_canonical_json};
use reach_fabric::pack::{compute_signature_hash, compute_signature_hash_bytes};
use reach_fabric::{
    build_merkle_tree, compute_run_fingerprint, lint, seed, Event, PackManifest,
};
use serde_json::json;

const GOLDEN_MANIFEST: &str = r#"{
    "metadata": {"id": "golden-pack", "version": "1.0.0", "name": "Golden", "description": "fixture"},
    "specVersion": "1.0",
    "declaredTools": ["http.get", "fs.read"],
    "declaredPermissions": ["net:egress"],
    "executionGraph": {
        "nodes": [{"id": "n1", "type": "Action"}, {"id": "n2", "type": "Condition"}],
        "edges": [{"from": "n1", "to": "n2"}]
    },
    "deterministic": true
}"#;

#[test]
fn golden_canonical_hashes() {
    let cases = [
        (
            json!({"environment": "production", "action": "deploy"}),
            "165b836d9d6e803d5ce1bb8b7a01437ff68928f549887360cf13a0d551a66e85",
        ),
        (
            json!({"c": {"z": 26, "a": 1}, "b": 2, "a": 1}),
            "24e4db09ae0e40a93e391725f9290725f3a8ffd15d33ed0bb39c394319087492",
        ),
        (
            json!({}),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a",
        ),
        (
            json!({"items": [1, "two", true, null, {"nested": "value"}]}),
            "7f76a9a8e0bec70c5d327b1ee560378ec256372034993f7cb7b676c77992f5cc",
        ),
    ];
    for (value, expected) in cases {
        for _ in 0..100 {
            assert_eq!(canonical_hash(&value).to_hex(), expected, "{value}");
        }
    }
}

#[test]
fn golden_prng() {
    assert_eq!(hash_seed("reach"), 1_291_669_624);
    let draws: Vec<f64> = seed("chaos-seed-42").take(5).collect();
    assert_eq!(
        draws,
        vec![
            0.7931201462633908,
            0.834854309912771,
            0.11204897216521204,
            0.6290643073152751,
            0.7180929102469236,
        ]
    );
    assert_eq!(seed("shuffle").shuffle(&[1, 2, 3, 4, 5, 6, 7, 8]), vec![5, 2, 3, 8, 6, 7, 1, 4]);
}

#[test]
fn golden_merkle_roots() {
    let cases: [(Vec<&str>, &str); 3] = [
        (vec!["only"], "f905b19542ed08c9a9c26543cca32e5711d207dcffb81b4cdb44ce0b989431c9"),
        (vec!["a", "b", "c"], "d31a37ef6ac14a2db1470c4316beb5592e6afd4465022339adafda76a18ffabe"),
        (vec!["a", "b", "c", "d"], "14ede5e8e97ad9372327728f5099b95604a39593cac3bd38a343ad76205213e7"),
    ];
    for (leaves, expected) in cases {
        assert_eq!(build_merkle_tree(&leaves).unwrap().root_hex(), expected);
    }
}

#[test]
fn golden_pack() {
    let result = lint(GOLDEN_MANIFEST.as_bytes());
    assert!(result.valid, "errors: {:?}", result.errors);
    assert_eq!(
        result.hash.unwrap().to_hex(),
        "057e5a00044d7b71b4cd46358c5aa9c6b815ed456ffee32160ff7f7e49e24286"
    );
    assert_eq!(
        result.merkle_root.unwrap().to_hex(),
        "f7e4d49102d31507d860723c1d0ea8b5220e701471d7780d1c928271ef05ed0e"
    );

    let manifest = PackManifest::from_json_bytes(GOLDEN_MANIFEST.as_bytes()).unwrap();
    assert_eq!(
        to_canonical_json(&serde_json::to_value(&manifest.execution_graph).unwrap()),
        r#"{"edges":[{"from":"n1","to":"n2"}],"nodes":[{"id":"n1","type":"Action"},{"id":"n2","type":"Condition"}]}"#
    );
    assert_eq!(
        compute_signature_hash(&manifest).unwrap().to_hex(),
        "e84d359df550fff4f1d7e54ec6ffccff849402e6f121c328f1c873d7c8c04996"
    );
    assert_eq!(
        compute_signature_hash_bytes(GOLDEN_MANIFEST.as_bytes()).unwrap().to_hex(),
        "e84d359df550fff4f1d7e54ec6ffccff849402e6f121c328f1c873d7c8c04996"
    );
}

#[test]
fn golden_run_fingerprint() {
    let log = vec![
        Event::new("run.started", json!({"pack": "golden-pack"})),
        Event::new("run.completed", json!({"status": "ok"})),
    ];
    assert_eq!(
        compute_run_fingerprint("run-golden", &log).unwrap().to_hex(),
        "315e121dbc479eaaebf3ee00065af5acc8a7630677761c9303e4d37d340e7cdc"
    );
}
