//! Node value type for the architecture graph.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::graph::ontology::NodeKind;

/// Open, ordered property bag carried by nodes and edges.
///
/// The schema varies per kind, so values stay loosely typed and are narrowed
/// only where a known field of a known kind is read (see [`Node::prop_u64`]).
pub type Props = BTreeMap<String, Value>;

/// A node in the architecture graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Deterministic id: `<kind prefix>:<natural key>`.
    pub id: String,
    /// Closed kind.
    pub kind: NodeKind,
    /// Human-readable label.
    pub display_name: String,
    /// Free-text tags in insertion order, without duplicates.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Kind-specific attributes.
    #[serde(default)]
    pub props: Props,
}

impl Node {
    /// Create a node whose id is derived from `kind` and `natural_key`.
    pub fn new(kind: NodeKind, natural_key: &str, display_name: impl Into<String>) -> Self {
        Self {
            id: kind.node_id(natural_key),
            kind,
            display_name: display_name.into(),
            labels: Vec::new(),
            props: Props::new(),
        }
    }

    /// Add a label unless it is already present.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.add_label(label);
        self
    }

    /// Set a property.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Add a label unless it is already present.
    pub fn add_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    /// Check for a label.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Read a string property.
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    /// Read an unsigned integer property.
    pub fn prop_u64(&self, key: &str) -> Option<u64> {
        self.props.get(key).and_then(Value::as_u64)
    }

    /// Read a boolean property.
    pub fn prop_bool(&self, key: &str) -> Option<bool> {
        self.props.get(key).and_then(Value::as_bool)
    }
}

/// Conjunctive node filter for `find_nodes`. Absent filters match everything.
#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    pub kind: Option<NodeKind>,
    pub label: Option<String>,
    pub props_equal: Props,
}

impl NodeFilter {
    /// A filter that matches every node.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match only nodes of this kind.
    pub fn kind(kind: NodeKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props_equal.insert(key.into(), value.into());
        self
    }

    /// Whether the label and property parts of the filter match.
    pub fn matches_attributes(&self, node: &Node) -> bool {
        if let Some(label) = &self.label {
            if !node.has_label(label) {
                return false;
            }
        }
        self.props_equal
            .iter()
            .all(|(key, value)| node.props.get(key) == Some(value))
    }

    /// Whether the whole filter matches.
    pub fn matches(&self, node: &Node) -> bool {
        if let Some(kind) = self.kind {
            if node.kind != kind {
                return false;
            }
        }
        self.matches_attributes(node)
    }
}
