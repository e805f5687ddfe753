//! Canonical JSON for deterministic serialization.
//!
//! Every hash in the fabric is computed over this encoding, so two
//! implementations that agree on these rules produce identical digests:
//!
//! - Object keys sorted ascending by Unicode code point, at every depth
//! - Array order preserved
//! - No whitespace; `,` and `:` separators only
//! - Strings escaped exactly as `JSON.stringify` escapes them
//! - Numbers rendered with the ECMAScript `Number::toString` algorithm
//! - `-0` becomes `0`; `NaN` and `±Infinity` become `null`
//! - Integer literals beyond ±(2^53 − 1) become decimal strings
//!
//! **CRITICAL**: This encoding is FROZEN. Changes break every stored
//! fingerprint and Merkle root.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

use crate::error::{CoreError, Result};
use crate::hash::Sha256Hash;

/// Largest integer exactly representable as an IEEE-754 double.
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// A number in canonical form.
///
/// Holds the exact literal that will be written: either a safe integer or a
/// finite float rendered the way ECMAScript renders it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalNumber(String);

impl CanonicalNumber {
    /// Canonical form of an integer, or `None` if it is outside the safe range.
    pub fn from_i64(n: i64) -> Option<Self> {
        if n.unsigned_abs() > MAX_SAFE_INTEGER {
            None
        } else {
            Some(Self(n.to_string()))
        }
    }

    /// Canonical form of a float, or `None` if it is not finite.
    ///
    /// Integral values beyond [`MAX_SAFE_INTEGER`] render as plain digits
    /// here; [`canonicalize`] emits those as strings instead.
    pub fn from_f64(f: f64) -> Option<Self> {
        if f.is_finite() {
            Some(Self(format_ecmascript(f)))
        } else {
            None
        }
    }

    /// The literal text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value as a double.
    pub fn as_f64(&self) -> f64 {
        self.0.parse().unwrap_or(0.0)
    }
}

/// A structured value in canonical form.
///
/// Objects are backed by a `BTreeMap<String, _>`: UTF-8 byte order is the
/// same as Unicode code point order, so iteration order is the canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalValue {
    Null,
    Bool(bool),
    Number(CanonicalNumber),
    String(String),
    Array(Vec<CanonicalValue>),
    Object(BTreeMap<String, CanonicalValue>),
}

impl CanonicalValue {
    /// Short type name, used in diffs.
    pub fn type_name(&self) -> &'static str {
        match self {
            CanonicalValue::Null => "null",
            CanonicalValue::Bool(_) => "boolean",
            CanonicalValue::Number(_) => "number",
            CanonicalValue::String(_) => "string",
            CanonicalValue::Array(_) => "array",
            CanonicalValue::Object(_) => "object",
        }
    }

    /// Look up a key on an object value.
    pub fn get(&self, key: &str) -> Option<&CanonicalValue> {
        match self {
            CanonicalValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Borrow as a string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CanonicalValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert back to a `serde_json::Value`.
    ///
    /// Feeding the result to [`canonicalize`] yields `self` again.
    pub fn to_json_value(&self) -> Value {
        match self {
            CanonicalValue::Null => Value::Null,
            CanonicalValue::Bool(b) => Value::Bool(*b),
            CanonicalValue::Number(n) => n
                .as_str()
                .parse::<Number>()
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CanonicalValue::String(s) => Value::String(s.clone()),
            CanonicalValue::Array(items) => {
                Value::Array(items.iter().map(CanonicalValue::to_json_value).collect())
            }
            CanonicalValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json_value()))
                    .collect(),
            ),
        }
    }

    /// Canonical JSON text of this value.
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        write_value(&mut out, self);
        out
    }

    /// SHA-256 of the canonical JSON text.
    pub fn hash(&self) -> Sha256Hash {
        Sha256Hash::hash(self.to_canonical_string().as_bytes())
    }
}

impl From<&str> for CanonicalValue {
    fn from(s: &str) -> Self {
        CanonicalValue::String(s.to_string())
    }
}

impl From<String> for CanonicalValue {
    fn from(s: String) -> Self {
        CanonicalValue::String(s)
    }
}

impl From<bool> for CanonicalValue {
    fn from(b: bool) -> Self {
        CanonicalValue::Bool(b)
    }
}

impl From<i64> for CanonicalValue {
    fn from(n: i64) -> Self {
        match CanonicalNumber::from_i64(n) {
            Some(num) => CanonicalValue::Number(num),
            None => CanonicalValue::String(n.to_string()),
        }
    }
}

impl From<&Value> for CanonicalValue {
    fn from(value: &Value) -> Self {
        canonicalize(value)
    }
}

impl Serialize for CanonicalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CanonicalValue::Null => serializer.serialize_unit(),
            CanonicalValue::Bool(b) => serializer.serialize_bool(*b),
            CanonicalValue::Number(n) => match n.as_str().parse::<Number>() {
                Ok(literal) => literal.serialize(serializer),
                Err(_) => serializer.serialize_f64(n.as_f64()),
            },
            CanonicalValue::String(s) => serializer.serialize_str(s),
            CanonicalValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            CanonicalValue::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for CanonicalValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(canonicalize(&value))
    }
}

/// Normalize a JSON value into canonical form.
pub fn canonicalize(value: &Value) -> CanonicalValue {
    match value {
        Value::Null => CanonicalValue::Null,
        Value::Bool(b) => CanonicalValue::Bool(*b),
        Value::Number(n) => canonicalize_number(n),
        Value::String(s) => CanonicalValue::String(s.clone()),
        Value::Array(items) => CanonicalValue::Array(items.iter().map(canonicalize).collect()),
        Value::Object(map) => CanonicalValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect(),
        ),
    }
}

/// Normalize any serializable value into canonical form.
pub fn canonicalize_serializable<T: serde::Serialize + ?Sized>(value: &T) -> Result<CanonicalValue> {
    let json = serde_json::to_value(value).map_err(|e| CoreError::Serialization(e.to_string()))?;
    Ok(canonicalize(&json))
}

/// Canonical JSON text of a canonical value.
pub fn serialize(value: &CanonicalValue) -> String {
    value.to_canonical_string()
}

/// Canonicalize and serialize in one step.
pub fn to_canonical_json(value: &Value) -> String {
    canonicalize(value).to_canonical_string()
}

/// Canonical JSON bytes of a JSON value.
pub fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    to_canonical_json(value).into_bytes()
}

/// Canonical JSON bytes of any serializable value.
pub fn canonical_bytes_of<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(canonicalize_serializable(value)?
        .to_canonical_string()
        .into_bytes())
}

/// True iff both values have the same canonical JSON.
pub fn equal(a: &Value, b: &Value) -> bool {
    to_canonical_json(a) == to_canonical_json(b)
}

/// `sha256(canonical_json(value))`.
pub fn canonical_hash(value: &Value) -> Sha256Hash {
    Sha256Hash::hash(to_canonical_json(value).as_bytes())
}

/// `sha256(canonical_json(value))` for any serializable value.
pub fn canonical_hash_of<T: serde::Serialize + ?Sized>(value: &T) -> Result<Sha256Hash> {
    Ok(canonicalize_serializable(value)?.hash())
}

/// Canonicalize a number, checking integer range on the literal digits.
///
/// The check happens before any conversion to `f64`, so an integer that
/// does not fit a double is never silently rounded.
fn canonicalize_number(n: &Number) -> CanonicalValue {
    let literal = n.to_string();
    if let Some(value) = integer_literal(&literal) {
        return value;
    }
    match n.as_f64() {
        Some(f) => canonicalize_float(f),
        None => CanonicalValue::Null,
    }
}

/// Canonicalize a double.
///
/// An integral value beyond the safe range that renders in plain digits is
/// emitted as a string, exactly as the same digits written as an integer
/// literal would be. Otherwise re-reading the output would change it.
fn canonicalize_float(f: f64) -> CanonicalValue {
    match CanonicalNumber::from_f64(f) {
        Some(num) if f.fract() == 0.0 && f.abs() > MAX_SAFE_INTEGER as f64 && f.abs() < 1e21 => {
            CanonicalValue::String(num.0)
        }
        Some(num) => CanonicalValue::Number(num),
        None => CanonicalValue::Null,
    }
}

/// Handle a plain integer literal (`-?[0-9]+`), or return `None`.
fn integer_literal(literal: &str) -> Option<CanonicalValue> {
    let (negative, digits) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let trimmed = digits.trim_start_matches('0');
    let magnitude = match trimmed.parse::<u64>() {
        Ok(m) => Some(m),
        Err(_) if trimmed.is_empty() => Some(0),
        Err(_) => None,
    };

    match magnitude {
        Some(0) => Some(CanonicalValue::Number(CanonicalNumber("0".to_string()))),
        Some(m) if m <= MAX_SAFE_INTEGER => {
            let text = if negative { format!("-{m}") } else { m.to_string() };
            Some(CanonicalValue::Number(CanonicalNumber(text)))
        }
        _ => {
            let text = if negative {
                format!("-{trimmed}")
            } else {
                trimmed.to_string()
            };
            Some(CanonicalValue::String(text))
        }
    }
}

/// Render a finite double the way ECMAScript `Number::toString` does.
///
/// Rust's `{:e}` formatting yields the shortest round-trip digits; only the
/// placement of the decimal point and exponent differs between the two.
fn format_ecmascript(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{:e}", f.abs());
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return f.to_string(),
    };
    let exponent: i32 = match exponent.parse() {
        Ok(e) => e,
        Err(_) => return f.to_string(),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent + 1;

    let mut out = String::new();
    if f < 0.0 {
        out.push('-');
    }

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((n - k) as usize));
    } else if 0 < n && n <= 21 {
        out.push_str(&digits[..n as usize]);
        out.push('.');
        out.push_str(&digits[n as usize..]);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-n) as usize));
        out.push_str(&digits);
    } else {
        let e = n - 1;
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if e >= 0 { '+' } else { '-' });
        let _ = write!(out, "{}", e.abs());
    }
    out
}

fn write_value(out: &mut String, value: &CanonicalValue) {
    match value {
        CanonicalValue::Null => out.push_str("null"),
        CanonicalValue::Bool(true) => out.push_str("true"),
        CanonicalValue::Bool(false) => out.push_str("false"),
        CanonicalValue::Number(n) => out.push_str(n.as_str()),
        CanonicalValue::String(s) => write_string(out, s),
        CanonicalValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        CanonicalValue::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\u{20}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
