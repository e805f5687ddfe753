//! Pack manifest data model.
//!
//! Field names are camelCase on output. On input the snake_case spellings
//! (`declared_tools`, `execution_graph`, ...) are accepted as aliases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use reach_fabric_core::canonical_bytes_of;

use crate::error::{PackError, Result};

/// Descriptive metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A node of the execution graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<BTreeMap<String, Value>>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            ..Self::default()
        }
    }
}

/// A directed edge between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// The execution graph. Must be a DAG.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl ExecutionGraph {
    /// Canonical JSON bytes of the graph.
    ///
    /// Input for `LintResult::hash` and leaf 3 of the integrity tree.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        Ok(canonical_bytes_of(self)?)
    }
}

/// A pack manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackManifest {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, alias = "spec_version", skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<String>,
    #[serde(default, alias = "declared_tools")]
    pub declared_tools: Vec<String>,
    #[serde(default, alias = "declared_permissions")]
    pub declared_permissions: Vec<String>,
    #[serde(default, alias = "execution_graph")]
    pub execution_graph: ExecutionGraph,
    #[serde(default)]
    pub deterministic: bool,
    #[serde(default, alias = "signature_hash", skip_serializing_if = "Option::is_none")]
    pub signature_hash: Option<String>,
}

impl PackManifest {
    /// Parse manifest JSON.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| PackError::Parse(e.to_string()))
    }

    /// Canonical JSON bytes of the whole manifest.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        Ok(canonical_bytes_of(self)?)
    }
}

/// Canonical JSON bytes of an execution graph.
pub fn canonical_graph_bytes(graph: &ExecutionGraph) -> Result<Vec<u8>> {
    graph.canonical_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camel_case() {
        let m = PackManifest::from_json_bytes(
            br#"{"metadata":{"id":"p","version":"1.0.0","name":"P"},"specVersion":"1.0",
                "declaredTools":["t"],"declaredPermissions":["read"],
                "executionGraph":{"nodes":[{"id":"n1","type":"Action"}],"edges":[]},
                "deterministic":true}"#,
        )
        .unwrap();
        assert_eq!(m.spec_version.as_deref(), Some("1.0"));
        assert_eq!(m.declared_tools, vec!["t"]);
        assert_eq!(m.execution_graph.nodes[0].node_type, "Action");
        assert!(m.deterministic);
    }

    #[test]
    fn test_parse_snake_case_aliases() {
        let m = PackManifest::from_json_bytes(
            br#"{"metadata":{"id":"p"},"spec_version":"1.0","declared_tools":["a","b"],
                "declared_permissions":["sys:admin"],
                "execution_graph":{"nodes":[],"edges":[]}}"#,
        )
        .unwrap();
        assert_eq!(m.declared_tools, vec!["a", "b"]);
        assert_eq!(m.declared_permissions, vec!["sys:admin"]);
        assert!(!m.deterministic);
    }

    #[test]
    fn test_parse_error() {
        let err = PackManifest::from_json_bytes(b"{invalid json").unwrap_err();
        assert!(err.to_string().starts_with("JSON parse error: "));
    }

    #[test]
    fn test_canonical_graph_bytes_sorted() {
        let graph = ExecutionGraph {
            nodes: vec![Node::new("n1", "Action")],
            edges: vec![Edge::new("n1", "n1")],
        };
        let bytes = canonical_graph_bytes(&graph).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"edges":[{"from":"n1","to":"n1"}],"nodes":[{"id":"n1","type":"Action"}]}"#
        );
    }

    #[test]
    fn test_canonical_output_uses_camel_case() {
        let m = PackManifest {
            spec_version: Some("1.0".into()),
            declared_tools: vec!["x".into()],
            ..PackManifest::default()
        };
        let text = String::from_utf8(m.canonical_bytes().unwrap()).unwrap();
        assert!(text.contains("\"declaredTools\":[\"x\"]"));
        assert!(text.contains("\"specVersion\":\"1.0\""));
        assert!(!text.contains("signatureHash"));
    }
}
