//! Run events and schema-version gating.
//!
//! An event without `schemaVersion` takes the default version. An event that
//! names an unsupported version is rejected, never coerced.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReplayError, Result};

/// Schema version assumed when an event does not carry one.
pub const DEFAULT_SCHEMA_VERSION: &str = "1.0.0";

/// Event type whose payload may be any JSON value.
pub const RAW_PAYLOAD_EVENT_TYPE: &str = "replay.event";

/// One entry of a run's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(
        rename = "schemaVersion",
        alias = "schema_version",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub schema_version: Option<String>,
}

impl Event {
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
            schema_version: None,
        }
    }

    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = Some(version.into());
        self
    }

    /// The version this event declares, from the event or its payload.
    pub fn declared_version(&self) -> Option<&str> {
        self.schema_version
            .as_deref()
            .or_else(|| self.payload.get("schemaVersion").and_then(Value::as_str))
            .filter(|v| !v.is_empty())
    }
}

/// Replay compatibility policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub supported_schema_versions: Vec<String>,
    pub default_schema_version: String,
    /// Payload fields that must be present, per event type.
    pub required_payload_fields: BTreeMap<String, Vec<String>>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            ("spawn.event", &["spawnId", "sessionId", "goal", "depth", "status"]),
            ("guardrail.stop", &["reason", "triggeredBy", "runId"]),
            (
                "session.started",
                &["sessionId", "tenantId", "status", "startedAt", "members"],
            ),
            (
                "capsule.sync",
                &["capsuleId", "session", "spawn", "syncState", "updatedAt"],
            ),
            ("policy.gate.requested", &["gate_id", "reason"]),
            ("policy.gate.resolved", &["gate_id", "decision"]),
            ("policy.gate.stored", &["id", "tool", "reason"]),
        ];
        Self {
            supported_schema_versions: vec![DEFAULT_SCHEMA_VERSION.to_string()],
            default_schema_version: DEFAULT_SCHEMA_VERSION.to_string(),
            required_payload_fields: table
                .iter()
                .map(|(ty, fields)| {
                    (
                        ty.to_string(),
                        fields.iter().map(|f| f.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl ReplayConfig {
    pub fn is_supported(&self, version: &str) -> bool {
        self.supported_schema_versions.iter().any(|v| v == version)
    }
}

/// Resolve the schema version and check the payload shape.
///
/// Payloads must be JSON objects, except for [`RAW_PAYLOAD_EVENT_TYPE`]
/// events, which carry arbitrary JSON.
///
/// `index` is the event's position in its log and is only used for errors.
pub fn normalize_event(index: usize, event: &Event, config: &ReplayConfig) -> Result<Event> {
    let version = match event.declared_version() {
        None => config.default_schema_version.clone(),
        Some(v) if config.is_supported(v) => v.to_string(),
        Some(v) => {
            tracing::warn!(index, version = v, "rejected event with unsupported schema version");
            return Err(ReplayError::VersionIncompatible {
                index,
                found: v.to_string(),
                supported: config.supported_schema_versions.clone(),
            });
        }
    };

    if event.event_type != RAW_PAYLOAD_EVENT_TYPE && !event.payload.is_object() {
        return Err(ReplayError::PayloadNotObject {
            index,
            event_type: event.event_type.clone(),
        });
    }

    if let Some(required) = config.required_payload_fields.get(&event.event_type) {
        let body = event
            .payload
            .as_object()
            .ok_or_else(|| ReplayError::PayloadNotObject {
                index,
                event_type: event.event_type.clone(),
            })?;
        if let Some(field) = required.iter().find(|f| !body.contains_key(f.as_str())) {
            return Err(ReplayError::MissingPayloadField {
                index,
                event_type: event.event_type.clone(),
                field: field.clone(),
            });
        }
    }

    Ok(Event {
        event_type: event.event_type.clone(),
        payload: event.payload.clone(),
        schema_version: Some(version),
    })
}

/// Normalize every event of a log, failing on the first rejection.
pub fn normalize_log(log: &[Event], config: &ReplayConfig) -> Result<Vec<Event>> {
    log.iter()
        .enumerate()
        .map(|(i, e)| normalize_event(i, e, config))
        .collect()
}

/// Parse an NDJSON event log. Blank lines are skipped.
pub fn parse_ndjson_log(bytes: &[u8]) -> Result<Vec<Event>> {
    let text = std::str::from_utf8(bytes).map_err(|e| ReplayError::Parse {
        line: 0,
        message: format!("invalid UTF-8: {e}"),
    })?;

    let mut events = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(line).map_err(|e| ReplayError::Parse {
            line: i + 1,
            message: e.to_string(),
        })?;
        events.push(event);
    }
    tracing::trace!(events = events.len(), "parsed event log");
    Ok(events)
}
