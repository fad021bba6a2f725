//! Edge value type for the architecture graph.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::node::Props;
use crate::graph::ontology::EdgeKind;

/// A directed, typed, property-bearing relationship between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
    /// Relationship kind
    pub kind: EdgeKind,
    /// Edge-specific facts (call line, operation, ...)
    #[serde(default)]
    pub props: Props,
}

/// Merge key of an edge.
pub type EdgeKey = (String, String, EdgeKind);

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            props: Props::new(),
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// The `(source, target, kind)` merge key.
    pub fn key(&self) -> EdgeKey {
        (self.source.clone(), self.target.clone(), self.kind)
    }
}
