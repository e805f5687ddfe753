//! Static checks over a pack manifest.
//!
//! Lint always runs to completion and reports every finding. Errors make the
//! manifest invalid; warnings are advisory and never change `valid`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use reach_fabric_core::Sha256Hash;
use reach_fabric_merkle::{verify, MerkleProof};

use crate::integrity::{compute_pack_integrity, PackIntegrity, INTEGRITY_LEAF_COUNT};
use crate::manifest::{ExecutionGraph, Metadata, PackManifest};

/// Message reported for a cyclic execution graph.
pub const CYCLE_ERROR: &str = "execution graph contains cycles; must be a DAG";

/// Lint thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Spec versions must start with this prefix, otherwise a warning is raised.
    pub accepted_spec_major: String,
    /// Longest allowed tool name, in characters.
    pub max_tool_name_len: usize,
    /// Graphs larger than this draw a warning.
    pub max_graph_nodes: usize,
    /// DFS depth beyond which a graph is treated as cyclic.
    pub max_traversal_depth: usize,
    /// Permissions with this prefix draw a warning.
    pub system_permission_prefix: String,
    /// Leaf whose proof is attached to the result.
    pub proof_leaf_index: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            accepted_spec_major: "1.".to_string(),
            max_tool_name_len: 128,
            max_graph_nodes: 500,
            max_traversal_depth: 1000,
            system_permission_prefix: "sys:".to_string(),
            proof_leaf_index: crate::integrity::GRAPH_LEAF_INDEX,
        }
    }
}

/// Outcome of linting one manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub metadata: Metadata,
    /// `sha256(canonical graph bytes)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<Sha256Hash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merkle_root: Option<Sha256Hash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<PackIntegrity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<MerkleProof>,
}

impl LintResult {
    fn parse_failure(message: String) -> Self {
        Self {
            valid: false,
            errors: vec![message],
            warnings: Vec::new(),
            metadata: Metadata::default(),
            hash: None,
            merkle_root: None,
            integrity: None,
            proof: None,
        }
    }
}

/// Lint raw manifest bytes.
///
/// Malformed JSON is reported as a failed result, never as an `Err`.
pub fn lint(bytes: &[u8], config: &LintConfig) -> LintResult {
    match PackManifest::from_json_bytes(bytes) {
        Ok(manifest) => lint_manifest(&manifest, config),
        Err(e) => {
            tracing::debug!(error = %e, "manifest failed to parse");
            LintResult::parse_failure(e.to_string())
        }
    }
}

/// Lint an already-parsed manifest.
pub fn lint_manifest(manifest: &PackManifest, config: &LintConfig) -> LintResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    match manifest.spec_version.as_deref() {
        None | Some("") => errors.push("missing 'specVersion' field".to_string()),
        Some(v) if !v.starts_with(&config.accepted_spec_major) => warnings.push(format!(
            "unsupported specVersion: {v}, expected {}x",
            config.accepted_spec_major
        )),
        Some(_) => {}
    }

    for perm in &manifest.declared_permissions {
        if perm.starts_with(&config.system_permission_prefix) {
            warnings.push(format!("pack requests system permission: {perm}"));
        }
    }

    for tool in &manifest.declared_tools {
        if tool.chars().count() > config.max_tool_name_len {
            errors.push(format!("tool name too long: {tool}"));
        }
    }

    let graph = &manifest.execution_graph;
    if graph.nodes.len() > config.max_graph_nodes {
        warnings.push(format!(
            "large execution graph (>{} nodes); may impact performance",
            config.max_graph_nodes
        ));
    }

    errors.extend(check_graph_references(graph));
    if has_cycle(graph, config.max_traversal_depth) {
        errors.push(CYCLE_ERROR.to_string());
    }

    let mut hash = None;
    let mut merkle_root = None;
    let mut integrity = None;
    let mut proof = None;
    match graph.canonical_bytes() {
        Ok(graph_bytes) => {
            hash = Some(Sha256Hash::hash(&graph_bytes));
            match compute_pack_integrity(manifest, &graph_bytes) {
                Ok(pi) => {
                    proof = pi.proof(config.proof_leaf_index).ok();
                    merkle_root = Some(pi.merkle_root);
                    integrity = Some(pi);
                }
                Err(e) => warnings.push(format!("merkle tree computation failed: {e}")),
            }
        }
        Err(e) => warnings.push(format!("execution graph could not be canonicalized: {e}")),
    }

    let valid = errors.is_empty();
    if valid {
        tracing::debug!(
            pack = %manifest.metadata.id,
            warnings = warnings.len(),
            "manifest passed lint"
        );
    } else {
        tracing::warn!(
            pack = %manifest.metadata.id,
            errors = ?errors,
            "manifest failed lint"
        );
    }

    LintResult {
        valid,
        errors,
        warnings,
        metadata: manifest.metadata.clone(),
        hash,
        merkle_root,
        integrity,
        proof,
    }
}

/// Lint, then regenerate and verify a proof for every integrity leaf.
pub fn lint_with_merkle(bytes: &[u8], config: &LintConfig) -> LintResult {
    let mut result = lint(bytes, config);
    let Some(integrity) = result.integrity.clone() else {
        return result;
    };

    for i in 0..INTEGRITY_LEAF_COUNT {
        match integrity.proof(i) {
            Ok(proof) => {
                if !verify(&proof, &integrity.merkle_root) {
                    result
                        .errors
                        .push(format!("merkle proof verification failed for leaf {i}"));
                    result.valid = false;
                }
            }
            Err(e) => result
                .warnings
                .push(format!("failed to generate proof for leaf {i}: {e}")),
        }
    }
    result
}

/// Duplicate node ids and edges whose endpoints do not exist.
fn check_graph_references(graph: &ExecutionGraph) -> Vec<String> {
    let mut errors = Vec::new();
    let mut ids = HashSet::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if !ids.insert(node.id.as_str()) {
            errors.push(format!("duplicate node id: {}", node.id));
        }
    }
    for edge in &graph.edges {
        for endpoint in [&edge.from, &edge.to] {
            if !ids.contains(endpoint.as_str()) {
                errors.push(format!(
                    "edge {} -> {} references unknown node: {endpoint}",
                    edge.from, edge.to
                ));
            }
        }
    }
    errors
}

/// Iterative DFS with an on-stack set.
///
/// A back edge to a node still on the stack is a cycle. Exceeding
/// `max_depth` is also reported as a cycle.
fn has_cycle(graph: &ExecutionGraph, max_depth: usize) -> bool {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        adjacency
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();

    for root in graph.nodes.iter().map(|n| n.id.as_str()) {
        if visited.contains(root) {
            continue;
        }
        // (node, index of next child to explore)
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        visited.insert(root);
        on_stack.insert(root);

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let children = adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]);
            match children.get(next) {
                Some(&child) => {
                    frame.1 += 1;
                    if on_stack.contains(child) {
                        return true;
                    }
                    if visited.insert(child) {
                        if stack.len() > max_depth {
                            return true;
                        }
                        on_stack.insert(child);
                        stack.push((child, 0));
                    }
                }
                None => {
                    on_stack.remove(node);
                    stack.pop();
                }
            }
        }
    }
    false
}
