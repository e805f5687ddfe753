//! Run fingerprints and replay verdicts.
//!
//! `fingerprint(run_id, log) = sha256(canonical_json([run_id, event_0, ...]))`
//! where every event has been normalized first. The fingerprint is a
//! recomputable claim, never the source of truth.

use serde::{Deserialize, Serialize};

use reach_fabric_core::{canonicalize_serializable, diff_values, CanonicalValue, DiffField, Sha256Hash};

use crate::error::{ReplayError, Result};
use crate::event::{normalize_log, Event, ReplayConfig};

/// Outcome of comparing a stored fingerprint with a recomputed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict")]
pub enum ReplayVerdict {
    #[serde(rename = "REPLAY_VERIFIED")]
    Verified,
    #[serde(rename = "REPLAY_MISMATCH")]
    Mismatch { expected: String, actual: String },
}

impl ReplayVerdict {
    pub fn is_verified(&self) -> bool {
        matches!(self, ReplayVerdict::Verified)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplayVerdict::Verified => "REPLAY_VERIFIED",
            ReplayVerdict::Mismatch { .. } => "REPLAY_MISMATCH",
        }
    }
}

/// Verdict plus, on mismatch, where the logs first diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub verdict: ReplayVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_divergent_index: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diff: Vec<DiffField>,
}

/// Canonical form of a run: `[run_id, ...normalized events]`.
pub fn canonical_run(run_id: &str, log: &[Event], config: &ReplayConfig) -> Result<CanonicalValue> {
    let events = canonical_events(log, config)?;
    let mut items = Vec::with_capacity(events.len() + 1);
    items.push(CanonicalValue::from(run_id));
    items.extend(events);
    Ok(CanonicalValue::Array(items))
}

fn canonical_events(log: &[Event], config: &ReplayConfig) -> Result<Vec<CanonicalValue>> {
    normalize_log(log, config)?
        .iter()
        .map(|e| canonicalize_serializable(e).map_err(ReplayError::from))
        .collect()
}

/// Fingerprint of a run.
pub fn compute_run_fingerprint(run_id: &str, log: &[Event], config: &ReplayConfig) -> Result<Sha256Hash> {
    let fingerprint = canonical_run(run_id, log, config)?.hash();
    tracing::debug!(run_id, events = log.len(), fingerprint = %fingerprint, "computed run fingerprint");
    Ok(fingerprint)
}

/// Compare a stored fingerprint with a recomputed one.
pub fn verify_replay(stored: &Sha256Hash, recomputed: &Sha256Hash) -> ReplayVerdict {
    if stored == recomputed {
        ReplayVerdict::Verified
    } else {
        tracing::warn!(expected = %stored, actual = %recomputed, "replay fingerprint mismatch");
        ReplayVerdict::Mismatch {
            expected: stored.to_hex(),
            actual: recomputed.to_hex(),
        }
    }
}

/// Fingerprint both logs, compare, and locate the first divergent event.
pub fn verify_replay_logs(
    run_id: &str,
    stored_log: &[Event],
    replayed_log: &[Event],
    config: &ReplayConfig,
) -> Result<ReplayReport> {
    let stored = canonical_events(stored_log, config)?;
    let replayed = canonical_events(replayed_log, config)?;

    let expected = compute_run_fingerprint(run_id, stored_log, config)?;
    let actual = compute_run_fingerprint(run_id, replayed_log, config)?;
    let verdict = verify_replay(&expected, &actual);
    if verdict.is_verified() {
        return Ok(ReplayReport {
            verdict,
            first_divergent_index: None,
            diff: Vec::new(),
        });
    }

    let first_divergent_index = stored
        .iter()
        .zip(&replayed)
        .position(|(a, b)| a != b)
        .or_else(|| (stored.len() != replayed.len()).then(|| stored.len().min(replayed.len())));

    let diff = match first_divergent_index {
        Some(i) => match (stored.get(i), replayed.get(i)) {
            (Some(a), Some(b)) => diff_values(a, b),
            _ => Vec::new(),
        },
        None => Vec::new(),
    };

    Ok(ReplayReport {
        verdict,
        first_divergent_index,
        diff,
    })
}
