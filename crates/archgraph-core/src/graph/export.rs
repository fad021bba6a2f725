//! Portable node/edge documents.
//!
//! A [`GraphDocument`] is the whole graph as two sorted lists. Replaying it
//! through any [`GraphBackend`] rebuilds the same graph: nodes first so that
//! every edge finds its endpoints.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::GraphError;
use super::models::{Edge, GraphStats, Node, NodeFilter};
use super::GraphBackend;

/// Serialized form of a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphDocument {
    /// Build a document with stable ordering: nodes by id, edges by key.
    pub fn new(mut nodes: Vec<Node>, mut edges: Vec<Edge>) -> Self {
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        edges.sort_by(|a, b| a.key().cmp(&b.key()));
        Self { nodes, edges }
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
        }
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String, GraphError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self, GraphError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Upsert every node, then every edge, into `backend`.
    ///
    /// Returns what the backend holds afterwards.
    pub async fn replay(&self, backend: &dyn GraphBackend) -> Result<GraphStats, GraphError> {
        for node in &self.nodes {
            backend.upsert_node(node.clone()).await?;
        }
        for edge in &self.edges {
            backend.upsert_edge(edge.clone()).await?;
        }

        let stats = backend.stats().await?;
        info!(
            nodes = stats.nodes,
            edges = stats.edges,
            backend = backend.backend_name(),
            "replayed graph document"
        );
        Ok(stats)
    }
}

/// Read the whole graph out of a backend.
pub async fn export_graph(backend: &dyn GraphBackend) -> Result<GraphDocument, GraphError> {
    let nodes = backend.find_nodes(&NodeFilter::any()).await?;
    let edges = backend.edges().await?;
    Ok(GraphDocument::new(nodes, edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeKind, InMemoryGraph, NodeKind};

    #[test]
    fn test_document_is_sorted() {
        let doc = GraphDocument::new(
            vec![
                Node::new(NodeKind::Module, "b", "b"),
                Node::new(NodeKind::Module, "a", "a"),
            ],
            vec![
                Edge::new("module:b", "module:a", EdgeKind::DependsOn),
                Edge::new("module:a", "module:b", EdgeKind::DependsOn),
            ],
        );
        assert_eq!(doc.nodes[0].id, "module:a");
        assert_eq!(doc.edges[0].source, "module:a");
    }

    #[test]
    fn test_unknown_kinds_survive_parsing() {
        let json = r#"{
            "nodes": [{"id": "gadget:x", "kind": "gadget", "display_name": "x"}],
            "edges": [{"source": "gadget:x", "target": "gadget:x", "kind": "wires"}]
        }"#;
        let doc = GraphDocument::from_json(json).unwrap();
        assert_eq!(doc.nodes[0].kind, NodeKind::Unknown);
        assert_eq!(doc.edges[0].kind, EdgeKind::RelatedTo);
        assert!(doc.nodes[0].labels.is_empty());
    }

    #[tokio::test]
    async fn test_yaml_replay() {
        let source = InMemoryGraph::new();
        source
            .upsert_node(Node::new(NodeKind::Module, "a", "a").with_prop("lines", 3))
            .await
            .unwrap();
        source
            .upsert_node(Node::new(NodeKind::Procedure, "a:Run", "Run"))
            .await
            .unwrap();
        source
            .upsert_edge(Edge::new("module:a", "procedure:a:Run", EdgeKind::Owns))
            .await
            .unwrap();

        let yaml = export_graph(&source).await.unwrap().to_yaml().unwrap();
        let target = InMemoryGraph::new();
        let stats = GraphDocument::from_yaml(&yaml)
            .unwrap()
            .replay(&target)
            .await
            .unwrap();

        assert_eq!(stats, GraphStats { nodes: 2, edges: 1 });
        let module = target.get_node("module:a").await.unwrap().unwrap();
        assert_eq!(module.prop_u64("lines"), Some(3));
    }
}
