//! In-memory graph backend for tests and prototyping.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use super::error::GraphError;
use super::models::{Edge, EdgeKey, GraphStats, Node, NodeFilter};
use super::ontology::EdgeKind;
use super::GraphBackend;

#[derive(Default)]
struct GraphState {
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<EdgeKey, Edge>,
    outgoing: HashMap<String, BTreeSet<EdgeKey>>,
}

/// Graph held entirely in process memory.
///
/// Each call takes the lock for its own duration only, so a sequence of calls
/// is not isolated from other writers. Use it from one task at a time, or
/// serialize writers externally.
#[derive(Default)]
pub struct InMemoryGraph {
    state: RwLock<GraphState>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.state.read().edges.len()
    }
}

#[async_trait]
impl GraphBackend for InMemoryGraph {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn upsert_node(&self, node: Node) -> Result<(), GraphError> {
        self.state.write().nodes.insert(node.id.clone(), node);
        Ok(())
    }

    async fn upsert_edge(&self, edge: Edge) -> Result<(), GraphError> {
        let mut state = self.state.write();

        if !state.nodes.contains_key(&edge.source) || !state.nodes.contains_key(&edge.target) {
            debug!(
                source = %edge.source,
                target = %edge.target,
                kind = %edge.kind,
                "dropping edge with missing endpoint"
            );
            return Ok(());
        }

        let key = edge.key();
        state
            .outgoing
            .entry(edge.source.clone())
            .or_default()
            .insert(key.clone());
        state.edges.insert(key, edge);
        Ok(())
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError> {
        Ok(self.state.read().nodes.get(id).cloned())
    }

    async fn neighbors(
        &self,
        id: &str,
        kinds: Option<&[EdgeKind]>,
    ) -> Result<Vec<Node>, GraphError> {
        let state = self.state.read();
        let Some(keys) = state.outgoing.get(id) else {
            return Ok(Vec::new());
        };

        let mut seen = BTreeSet::new();
        let mut result = Vec::new();
        for (_, target, kind) in keys {
            if let Some(kinds) = kinds {
                if !kinds.contains(kind) {
                    continue;
                }
            }
            if !seen.insert(target.as_str()) {
                continue;
            }
            if let Some(node) = state.nodes.get(target) {
                result.push(node.clone());
            }
        }
        Ok(result)
    }

    async fn find_nodes(&self, filter: &NodeFilter) -> Result<Vec<Node>, GraphError> {
        Ok(self
            .state
            .read()
            .nodes
            .values()
            .filter(|node| filter.matches(node))
            .cloned()
            .collect())
    }

    async fn edges(&self) -> Result<Vec<Edge>, GraphError> {
        Ok(self.state.read().edges.values().cloned().collect())
    }

    async fn stats(&self) -> Result<GraphStats, GraphError> {
        let state = self.state.read();
        Ok(GraphStats {
            nodes: state.nodes.len(),
            edges: state.edges.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    fn module(name: &str) -> Node {
        Node::new(NodeKind::Module, name, name)
    }

    #[tokio::test]
    async fn test_upsert_overwrites_props() {
        let graph = InMemoryGraph::new();
        graph
            .upsert_node(module("Sales").with_prop("lines", 10))
            .await
            .unwrap();
        graph
            .upsert_node(module("Sales").with_prop("owner", "team-a"))
            .await
            .unwrap();

        let node = graph.get_node("module:Sales").await.unwrap().unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(node.prop_str("owner"), Some("team-a"));
        assert!(node.props.get("lines").is_none());
    }

    #[tokio::test]
    async fn test_edge_to_missing_node_is_dropped() {
        let graph = InMemoryGraph::new();
        graph.upsert_node(module("A")).await.unwrap();
        graph
            .upsert_edge(Edge::new("module:A", "module:Ghost", EdgeKind::DependsOn))
            .await
            .unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.neighbors("module:A", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_neighbors_deduplicate_targets() {
        let graph = InMemoryGraph::new();
        graph.upsert_node(module("A")).await.unwrap();
        graph.upsert_node(module("B")).await.unwrap();
        graph
            .upsert_edge(Edge::new("module:A", "module:B", EdgeKind::DependsOn))
            .await
            .unwrap();
        graph
            .upsert_edge(Edge::new("module:A", "module:B", EdgeKind::Imports))
            .await
            .unwrap();

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.neighbors("module:A", None).await.unwrap().len(), 1);
    }
}
