//! Typed property graph of a source-code system.
//!
//! This module provides the graph data model and its storage:
//! - **Ontology** - closed node/edge kind taxonomy ([`NodeKind`], [`EdgeKind`])
//! - **Models** - [`Node`] and [`Edge`] value types with open property bags
//! - **Backends** - [`InMemoryGraph`] for tests and prototyping,
//!   [`SurrealGraphStore`] for persistent storage
//! - **Export** - portable node/edge documents
//!
//! # Backend contract
//!
//! Both backends implement [`GraphBackend`] with identical semantics:
//!
//! - `upsert_node` merges by id, last writer wins on every field.
//! - `upsert_edge` merges by `(source, target, kind)`. An edge whose endpoint
//!   is missing is silently not stored. The in-memory backend filters it out;
//!   the persistent backend's endpoint match comes back empty. Neither reports
//!   an error, and callers building graphs from partially ingested systems
//!   rely on that.
//!
//! # Example
//!
//! ```ignore
//! use archgraph_core::graph::{GraphBackend, InMemoryGraph, Node, NodeKind};
//!
//! let graph = InMemoryGraph::new();
//! graph.upsert_node(Node::new(NodeKind::Module, "Sales", "Sales")).await?;
//! let node = graph.get_node("module:Sales").await?;
//! ```

pub mod db;
mod error;
pub mod export;
pub mod memory;
pub mod models;
pub mod ontology;

pub use db::SurrealGraphStore;
pub use error::GraphError;
pub use export::GraphDocument;
pub use memory::InMemoryGraph;
pub use models::{Edge, EdgeKey, GraphStats, Node, NodeFilter, Props};
pub use ontology::{EdgeCategory, EdgeKind, NodeCategory, NodeKind};

use async_trait::async_trait;

/// Storage interface for the architecture graph.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// Short backend name for logs and reports.
    fn backend_name(&self) -> &'static str;

    /// Insert or overwrite a node, keyed by id.
    async fn upsert_node(&self, node: Node) -> Result<(), GraphError>;

    /// Insert or overwrite an edge, keyed by `(source, target, kind)`.
    ///
    /// Silently stores nothing when either endpoint is missing.
    async fn upsert_edge(&self, edge: Edge) -> Result<(), GraphError>;

    /// Look up a node by id.
    async fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError>;

    /// Outgoing neighbors of a node, optionally restricted to some edge kinds.
    /// Order is unspecified.
    async fn neighbors(
        &self,
        id: &str,
        kinds: Option<&[EdgeKind]>,
    ) -> Result<Vec<Node>, GraphError>;

    /// Nodes matching every provided part of the filter.
    async fn find_nodes(&self, filter: &NodeFilter) -> Result<Vec<Node>, GraphError>;

    /// Every stored edge.
    async fn edges(&self) -> Result<Vec<Edge>, GraphError>;

    /// Node and edge counts.
    async fn stats(&self) -> Result<GraphStats, GraphError> {
        Ok(GraphStats {
            nodes: self.find_nodes(&NodeFilter::any()).await?.len(),
            edges: self.edges().await?.len(),
        })
    }
}
