//! Error types for replay verification.

use thiserror::Error;

use reach_fabric_core::CoreError;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("event {index}: schemaVersion {found} is not supported (supported: {supported:?})")]
    VersionIncompatible {
        index: usize,
        found: String,
        supported: Vec<String>,
    },

    #[error("event {index}: {event_type} requires payload field {field}")]
    MissingPayloadField {
        index: usize,
        event_type: String,
        field: String,
    },

    #[error("event {index}: {event_type} payload must be a JSON object")]
    PayloadNotObject { index: usize, event_type: String },

    #[error("event log line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("determinism check requires at least 2 trials, got {0}")]
    TooFewTrials(usize),

    #[error("trial {trial} failed: {message}")]
    TrialFailed { trial: usize, message: String },

    #[error("nondeterminism detected at trial {trial}: expected {expected}, got {actual}")]
    Nondeterministic {
        trial: usize,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for replay operations.
pub type Result<T> = std::result::Result<T, ReplayError>;
