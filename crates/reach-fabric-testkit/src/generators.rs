//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use reach_fabric_pack::{Edge, ExecutionGraph, Metadata, Node, PackManifest};
use reach_fabric_replay::{Event, DEFAULT_SCHEMA_VERSION};

/// Generate an arbitrary JSON value.
///
/// Integers stay inside the `i32` range. Floats cover every finite double,
/// including integral values beyond the safe integer range.
pub fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(|f| json!(f)),
        ".{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(".{0,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Generate a JSON object.
pub fn json_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-zA-Z_]{1,8}", json_value(), 0..6)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
}

/// Generate a dotted tool name.
pub fn tool_name() -> impl Strategy<Value = String> {
    "[a-z]{1,12}\\.[a-z]{1,12}".prop_map(String::from)
}

/// Generate a non-system permission.
pub fn permission() -> impl Strategy<Value = String> {
    prop_oneof!["net:[a-z]{1,8}", "fs:[a-z]{1,8}"].prop_map(String::from)
}

/// Generate a node type.
pub fn node_type() -> impl Strategy<Value = String> {
    prop_oneof![Just("Action"), Just("Condition"), Just("Parallel")].prop_map(String::from)
}

/// Parameters for generating a manifest whose graph is always a DAG.
#[derive(Debug, Clone)]
pub struct ManifestParams {
    pub id: String,
    pub version: String,
    pub tools: Vec<String>,
    pub permissions: Vec<String>,
    pub node_types: Vec<String>,
    /// Raw index pairs; oriented low-to-high when the manifest is built.
    pub edges: Vec<(usize, usize)>,
    pub deterministic: bool,
}

impl Arbitrary for ManifestParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            "[a-z][a-z0-9-]{0,15}",
            (0u32..5, 0u32..20, 0u32..50),
            prop::collection::vec(tool_name(), 0..5),
            prop::collection::vec(permission(), 0..4),
            prop::collection::vec(node_type(), 0..16),
            prop::collection::vec((0usize..64, 0usize..64), 0..24),
            any::<bool>(),
        )
            .prop_map(|(id, (major, minor, patch), tools, permissions, node_types, edges, deterministic)| {
                ManifestParams {
                    id,
                    version: format!("{major}.{minor}.{patch}"),
                    tools,
                    permissions,
                    node_types,
                    edges,
                    deterministic,
                }
            })
            .boxed()
    }
}

/// Build a manifest from parameters.
///
/// Edges always point from a lower node index to a higher one, so the
/// resulting graph is acyclic and every reference resolves.
pub fn manifest_from_params(params: &ManifestParams) -> PackManifest {
    let nodes: Vec<Node> = params
        .node_types
        .iter()
        .enumerate()
        .map(|(i, ty)| Node::new(format!("n{i}"), ty.as_str()))
        .collect();

    let edges = if nodes.len() < 2 {
        Vec::new()
    } else {
        params
            .edges
            .iter()
            .map(|(a, b)| (a % nodes.len(), b % nodes.len()))
            .filter(|(a, b)| a != b)
            .map(|(a, b)| Edge::new(format!("n{}", a.min(b)), format!("n{}", a.max(b))))
            .collect()
    };

    PackManifest {
        metadata: Metadata {
            id: params.id.clone(),
            version: params.version.clone(),
            name: params.id.to_uppercase(),
            description: String::new(),
        },
        spec_version: Some("1.0".to_string()),
        declared_tools: params.tools.clone(),
        declared_permissions: params.permissions.clone(),
        execution_graph: ExecutionGraph { nodes, edges },
        deterministic: params.deterministic,
        signature_hash: None,
    }
}

/// Generate an event whose type carries no required payload fields.
pub fn event() -> impl Strategy<Value = Event> {
    (
        prop_oneof![Just("tool.call"), Just("tool.result"), Just("run.note")],
        json_object(),
        any::<bool>(),
    )
        .prop_map(|(ty, payload, explicit_version)| {
            let event = Event::new(ty, payload);
            if explicit_version {
                event.with_schema_version(DEFAULT_SCHEMA_VERSION)
            } else {
                event
            }
        })
}

/// Generate an event log of up to `max_len` events.
pub fn event_log(max_len: usize) -> impl Strategy<Value = Vec<Event>> {
    prop::collection::vec(event(), 0..=max_len)
}
