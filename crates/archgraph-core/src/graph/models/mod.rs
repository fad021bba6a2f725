//! Data models for the architecture graph.

mod edge;
mod node;

pub use edge::{Edge, EdgeKey};
pub use node::{Node, NodeFilter, Props};

use serde::{Deserialize, Serialize};

/// Node and edge counts of a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
}
