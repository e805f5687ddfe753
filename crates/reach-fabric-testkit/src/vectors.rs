//! Golden test vectors for cross-implementation verification.
//!
//! Expected values were produced independently of this crate. A mismatch
//! means the canonical encoding or the tree shape has drifted.

use serde_json::Value;

use reach_fabric_core::{canonical_hash, to_canonical_json};
use reach_fabric_merkle::MerkleTree;

/// A canonical JSON test vector.
#[derive(Debug, Clone)]
pub struct CanonicalVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Input JSON text, in any key order and spacing.
    pub input: &'static str,
    /// Expected canonical text.
    pub expected_canonical: &'static str,
    /// Expected `sha256(canonical)` (hex).
    pub expected_hash: &'static str,
}

/// A Merkle root test vector. Leaves are UTF-8 strings.
#[derive(Debug, Clone)]
pub struct MerkleVector {
    pub name: &'static str,
    pub leaves: &'static [&'static str],
    pub expected_root: &'static str,
}

/// Get all canonical JSON vectors.
pub fn canonical_vectors() -> Vec<CanonicalVector> {
    vec![
        CanonicalVector {
            name: "sorted keys",
            input: r#"{"b": 2, "a": 1}"#,
            expected_canonical: r#"{"a":1,"b":2}"#,
            expected_hash: "43258cff783fe7036d8a43033f830adfc60ec037382473548ac742b888292777",
        },
        CanonicalVector {
            name: "nested objects",
            input: r#"{"c": {"z": 26, "a": 1}, "b": 2, "a": 1}"#,
            expected_canonical: r#"{"a":1,"b":2,"c":{"a":1,"z":26}}"#,
            expected_hash: "24e4db09ae0e40a93e391725f9290725f3a8ffd15d33ed0bb39c394319087492",
        },
        CanonicalVector {
            name: "empty object",
            input: "{ }",
            expected_canonical: "{}",
            expected_hash: "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a",
        },
        CanonicalVector {
            name: "mixed array",
            input: r#"{"items": [1, "two", true, null, {"nested": "value"}]}"#,
            expected_canonical: r#"{"items":[1,"two",true,null,{"nested":"value"}]}"#,
            expected_hash: "7f76a9a8e0bec70c5d327b1ee560378ec256372034993f7cb7b676c77992f5cc",
        },
        CanonicalVector {
            name: "unsafe integer",
            input: r#"{"big": 9007199254740993}"#,
            expected_canonical: r#"{"big":"9007199254740993"}"#,
            expected_hash: "9128067e9c2cd647f64a40f68aee10dffc20924eb6f3691c589346fb1ffc0985",
        },
        CanonicalVector {
            name: "float formatting",
            input: "[1.0, 0.5, 1e21, -0.0, 1e-7]",
            expected_canonical: "[1,0.5,1e+21,0,1e-7]",
            expected_hash: "6fc314b6ca353c5020fda51234e457d91918e1f3a35549a3a66eaa8fbfbe06bb",
        },
        CanonicalVector {
            name: "string escapes",
            input: r#"{"s": "a\"b\\c\n\u0001"}"#,
            expected_canonical: r#"{"s":"a\"b\\c\n\u0001"}"#,
            expected_hash: "bbe54c9c73120828ff25c5eb31b59be40031eea10574421aadf601bb1ec76cf2",
        },
    ]
}

/// Get all Merkle root vectors.
pub fn merkle_vectors() -> Vec<MerkleVector> {
    vec![
        MerkleVector {
            name: "single leaf",
            leaves: &["only"],
            expected_root: "f905b19542ed08c9a9c26543cca32e5711d207dcffb81b4cdb44ce0b989431c9",
        },
        MerkleVector {
            name: "odd leaf count",
            leaves: &["a", "b", "c"],
            expected_root: "d31a37ef6ac14a2db1470c4316beb5592e6afd4465022339adafda76a18ffabe",
        },
        MerkleVector {
            name: "balanced",
            leaves: &["a", "b", "c", "d"],
            expected_root: "14ede5e8e97ad9372327728f5099b95604a39593cac3bd38a343ad76205213e7",
        },
    ]
}

/// Canonical text and hash of a vector's input.
pub fn evaluate_canonical(vector: &CanonicalVector) -> (String, String) {
    match serde_json::from_str::<Value>(vector.input) {
        Ok(value) => (to_canonical_json(&value), canonical_hash(&value).to_hex()),
        Err(e) => (format!("<parse error: {e}>"), String::new()),
    }
}

/// Root of a Merkle vector, or an empty string if the tree cannot be built.
pub fn evaluate_merkle(vector: &MerkleVector) -> String {
    MerkleTree::build(vector.leaves)
        .map(|tree| tree.root_hex())
        .unwrap_or_default()
}

/// Run every vector and report `(name, matches, actual_hex)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let canonical = canonical_vectors().into_iter().map(|v| {
        let (text, hash) = evaluate_canonical(&v);
        let ok = text == v.expected_canonical && hash == v.expected_hash;
        (v.name.to_string(), ok, hash)
    });
    let merkle = merkle_vectors().into_iter().map(|v| {
        let root = evaluate_merkle(&v);
        (v.name.to_string(), root == v.expected_root, root)
    });
    canonical.chain(merkle).collect()
}
