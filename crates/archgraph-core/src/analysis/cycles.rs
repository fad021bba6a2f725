//! Bounded simple-cycle search over dependency edges.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::graph::Edge;

/// Severity tier of a dependency cycle. Longer cycles are harder to untangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn for_length(length: usize) -> Self {
        match length {
            0..=2 => Self::Low,
            3 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A dependency cycle. `nodes[0]` depends on `nodes[1]`, and so on; the last
/// node depends on the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub nodes: Vec<String>,
    pub length: usize,
    pub severity: Severity,
}

impl Cycle {
    pub fn new(nodes: Vec<String>) -> Self {
        let length = nodes.len();
        Self {
            nodes,
            length,
            severity: Severity::for_length(length),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }
}

/// Outgoing dependency targets per node.
pub type Adjacency = BTreeMap<String, BTreeSet<String>>;

/// Adjacency over dependency-family edges. With a scope, both endpoints must
/// be in it. Self-loops are ignored.
pub fn dependency_adjacency(edges: &[Edge], scope: Option<&HashSet<&str>>) -> Adjacency {
    let in_scope = |id: &str| scope.map_or(true, |s| s.contains(id));
    let mut adjacency = Adjacency::new();

    for edge in edges {
        if !edge.kind.is_dependency() || edge.source == edge.target {
            continue;
        }
        if in_scope(&edge.source) && in_scope(&edge.target) {
            adjacency
                .entry(edge.source.clone())
                .or_default()
                .insert(edge.target.clone());
        }
    }
    adjacency
}

/// Every simple cycle with `2..=max_length` nodes, each reported once.
///
/// A cycle is reported starting from its smallest node id, so rotations of
/// the same cycle never show up twice.
pub fn find_cycles(adjacency: &Adjacency, max_length: usize) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    for start in adjacency.keys() {
        let mut path = vec![start.as_str()];
        search(adjacency, start, start, &mut path, max_length, true, &mut cycles);
    }
    cycles
}

/// Simple cycles through `start`, each beginning at `start`.
pub fn cycles_through(adjacency: &Adjacency, start: &str, max_length: usize) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    if let Some((key, _)) = adjacency.get_key_value(start) {
        let mut path = vec![key.as_str()];
        search(adjacency, key, key, &mut path, max_length, false, &mut cycles);
    }
    cycles
}

fn search<'a>(
    adjacency: &'a Adjacency,
    start: &'a str,
    current: &'a str,
    path: &mut Vec<&'a str>,
    max_length: usize,
    canonical: bool,
    out: &mut Vec<Cycle>,
) {
    let Some(targets) = adjacency.get(current) else {
        return;
    };

    for target in targets {
        let target = target.as_str();
        if target == start {
            if path.len() >= 2 {
                out.push(Cycle::new(path.iter().map(|s| s.to_string()).collect()));
            }
            continue;
        }
        if path.len() >= max_length || path.contains(&target) || (canonical && target < start) {
            continue;
        }

        path.push(target);
        search(adjacency, start, target, path, max_length, canonical, out);
        path.pop();
    }
}
