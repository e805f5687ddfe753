//! Signature basis for pack manifests.
//!
//! The signature hash covers the canonical JSON of every manifest field
//! except `signatureHash` itself. Any later edit to a sealed manifest
//! changes the recomputed hash and fails verification.
//!
//! The basis is the manifest JSON as received, so fields outside the typed
//! [`PackManifest`] model (extra metadata, model requirements, node options)
//! are covered too. Verify manifests received as bytes with
//! [`verify_signature_hash_bytes`]; the typed functions only see modeled fields.

use serde_json::Value;

use reach_fabric_core::{canonical_hash, canonical_json_bytes, CoreError, Sha256Hash};

use crate::error::{PackError, Result};
use crate::manifest::PackManifest;

/// Keys that carry the signature, in their camelCase and snake_case spellings.
const SIGNATURE_KEYS: [&str; 2] = ["signatureHash", "signature_hash"];

/// The manifest with its signature keys removed.
pub fn signature_basis(manifest: &Value) -> Value {
    let mut basis = manifest.clone();
    if let Value::Object(map) = &mut basis {
        for key in SIGNATURE_KEYS {
            map.remove(key);
        }
    }
    basis
}

/// Signature hash of a manifest JSON value.
pub fn compute_signature_hash_value(manifest: &Value) -> Sha256Hash {
    canonical_hash(&signature_basis(manifest))
}

/// Signature hash of raw manifest bytes.
pub fn compute_signature_hash_bytes(bytes: &[u8]) -> Result<Sha256Hash> {
    Ok(compute_signature_hash_value(&parse_value(bytes)?))
}

/// Seal raw manifest bytes.
///
/// Returns the canonical JSON of the manifest with `signatureHash` set.
/// Every field of the input is kept and signed.
pub fn seal_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut value = signature_basis(&parse_value(bytes)?);
    let hash = canonical_hash(&value);
    let Value::Object(map) = &mut value else {
        return Err(PackError::Parse("manifest must be a JSON object".to_string()));
    };
    map.insert(SIGNATURE_KEYS[0].to_string(), Value::String(hash.to_hex()));
    tracing::debug!(pack = %pack_id(&value), signature_hash = %hash, "sealed manifest bytes");
    Ok(canonical_json_bytes(&value))
}

/// Recompute and compare the signature hash of raw manifest bytes.
pub fn verify_signature_hash_bytes(bytes: &[u8]) -> Result<()> {
    let value = parse_value(bytes)?;
    let claimed = SIGNATURE_KEYS
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .ok_or(PackError::MissingSignatureHash)?;
    let actual = compute_signature_hash_value(&value).to_hex();
    compare(pack_id(&value), claimed, actual)
}

/// Signature hash of a typed manifest, over its modeled fields.
pub fn compute_signature_hash(manifest: &PackManifest) -> Result<Sha256Hash> {
    let value = serde_json::to_value(manifest).map_err(|e| CoreError::Serialization(e.to_string()))?;
    Ok(compute_signature_hash_value(&value))
}

/// Return a copy of the manifest with `signatureHash` filled in.
pub fn seal(manifest: &PackManifest) -> Result<PackManifest> {
    let hash = compute_signature_hash(manifest)?;
    tracing::debug!(pack = %manifest.metadata.id, signature_hash = %hash, "sealed manifest");
    Ok(PackManifest {
        signature_hash: Some(hash.to_hex()),
        ..manifest.clone()
    })
}

/// Recompute and compare the signature hash of a typed manifest.
pub fn verify_signature_hash(manifest: &PackManifest) -> Result<()> {
    let claimed = manifest
        .signature_hash
        .as_deref()
        .ok_or(PackError::MissingSignatureHash)?;
    let actual = compute_signature_hash(manifest)?.to_hex();
    compare(&manifest.metadata.id, claimed, actual)
}

fn parse_value(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| PackError::Parse(e.to_string()))
}

fn pack_id(manifest: &Value) -> &str {
    manifest
        .pointer("/metadata/id")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn compare(pack: &str, claimed: &str, actual: String) -> Result<()> {
    if claimed.eq_ignore_ascii_case(&actual) {
        Ok(())
    } else {
        tracing::warn!(
            pack = %pack,
            expected = %claimed,
            actual = %actual,
            "signature hash mismatch"
        );
        Err(PackError::SignatureMismatch {
            expected: claimed.to_string(),
            actual,
        })
    }
}
