//! Structural diff of canonical values.
//!
//! Used to explain *where* two runs diverged once their fingerprints differ.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalValue;

/// Why a path differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffReason {
    ValueMismatch,
    TypeMismatch,
    MissingInA,
    MissingInB,
    LengthMismatch,
}

impl fmt::Display for DiffReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiffReason::ValueMismatch => "value mismatch",
            DiffReason::TypeMismatch => "type mismatch",
            DiffReason::MissingInA => "missing in A",
            DiffReason::MissingInB => "missing in B",
            DiffReason::LengthMismatch => "length mismatch",
        })
    }
}

/// A single differing location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffField {
    /// Dotted path with `[i]` for array indices; empty for the root.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<CanonicalValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<CanonicalValue>,
    pub reason: DiffReason,
}

/// All differences between two values, in deterministic path order.
pub fn diff_values(a: &CanonicalValue, b: &CanonicalValue) -> Vec<DiffField> {
    let mut out = Vec::new();
    walk("", a, b, &mut out);
    out
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn walk(path: &str, a: &CanonicalValue, b: &CanonicalValue, out: &mut Vec<DiffField>) {
    match (a, b) {
        (CanonicalValue::Object(ma), CanonicalValue::Object(mb)) => {
            let mut keys: Vec<&String> = ma.keys().chain(mb.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                let p = child_path(path, key);
                match (ma.get(key), mb.get(key)) {
                    (Some(va), Some(vb)) => walk(&p, va, vb, out),
                    (Some(va), None) => out.push(DiffField {
                        path: p,
                        a: Some(va.clone()),
                        b: None,
                        reason: DiffReason::MissingInB,
                    }),
                    (None, Some(vb)) => out.push(DiffField {
                        path: p,
                        a: None,
                        b: Some(vb.clone()),
                        reason: DiffReason::MissingInA,
                    }),
                    (None, None) => {}
                }
            }
        }
        (CanonicalValue::Array(xa), CanonicalValue::Array(xb)) => {
            if xa.len() != xb.len() {
                out.push(DiffField {
                    path: path.to_string(),
                    a: Some(CanonicalValue::from(xa.len() as i64)),
                    b: Some(CanonicalValue::from(xb.len() as i64)),
                    reason: DiffReason::LengthMismatch,
                });
            }
            for (i, (va, vb)) in xa.iter().zip(xb.iter()).enumerate() {
                walk(&format!("{path}[{i}]"), va, vb, out);
            }
        }
        _ if a.type_name() != b.type_name() => out.push(DiffField {
            path: path.to_string(),
            a: Some(a.clone()),
            b: Some(b.clone()),
            reason: DiffReason::TypeMismatch,
        }),
        _ if a != b => out.push(DiffField {
            path: path.to_string(),
            a: Some(a.clone()),
            b: Some(b.clone()),
            reason: DiffReason::ValueMismatch,
        }),
        _ => {}
    }
}
