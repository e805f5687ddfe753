//! # Reach Fabric Replay
//!
//! Binds a run id and its ordered event log into one canonical fingerprint.
//!
//! ## Overview
//!
//! - Events default to schema version `1.0.0`; unsupported versions are rejected
//! - Typed events must carry their required payload fields
//! - The fingerprint is `sha256` over the canonical `[run_id, ...events]` array
//! - On mismatch, the first divergent event and its field diff are reported
//!
//! This crate performs no I/O. Event logs arrive as bytes or parsed values.

pub mod determinism;
pub mod error;
pub mod event;
pub mod fingerprint;

pub use determinism::verify_determinism;
pub use error::{ReplayError, Result};
pub use event::{
    normalize_event, normalize_log, parse_ndjson_log, Event, ReplayConfig,
    DEFAULT_SCHEMA_VERSION, RAW_PAYLOAD_EVENT_TYPE,
};
pub use fingerprint::{
    canonical_run, compute_run_fingerprint, verify_replay, verify_replay_logs, ReplayReport,
    ReplayVerdict,
};
