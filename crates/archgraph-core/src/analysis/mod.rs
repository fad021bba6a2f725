//! Read-only architecture analysis over a populated graph.
//!
//! All metrics are computed on modules, optionally scoped to one
//! configuration (the module prop `configuration`):
//!
//! - **Coupling** - mean outgoing dependency edges per module over a ceiling
//! - **Cohesion** - share of a module's call traffic that stays inside it
//! - **Cycles** - bounded simple cycles along dependency edges
//! - **God objects** - modules over the size or connectivity thresholds
//! - **Orphans** - modules without any edge
//!
//! [`ArchitectureAnalyzer::analyze`] bundles them with a composite score and
//! recommendations.

mod cycles;
mod recommendations;

pub use cycles::{cycles_through, dependency_adjacency, find_cycles, Adjacency, Cycle, Severity};
pub use recommendations::{
    recommend, Effort, Findings, IssueCategory, Priority, Recommendation,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::graph::{Edge, EdgeKind, GraphBackend, GraphError, Node, NodeFilter, NodeKind};

/// A module over at least one god-object threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GodObject {
    pub module_id: String,
    pub display_name: String,
    pub callables: usize,
    pub outgoing_dependencies: usize,
    pub incoming_dependencies: usize,
    /// Sum of the three counts.
    pub score: usize,
}

/// Everything [`ArchitectureAnalyzer::analyze`] finds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureReport {
    pub configuration: Option<String>,
    pub modules: usize,
    pub coupling: f64,
    pub cohesion: f64,
    pub cycles: Vec<Cycle>,
    pub god_objects: Vec<GodObject>,
    /// Ids of modules without edges.
    pub orphans: Vec<String>,
    /// 1.0 (worst) to 10.0 (best).
    pub score: f64,
    pub recommendations: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}

/// Composite architecture score in `[1, 10]`.
///
/// Starts at 10 and subtracts `coupling * 3`, `(1 - cohesion) * 2`,
/// `min(cycles * 0.5, 3)` and `min(god_objects * 0.3, 2)`.
pub fn composite_score(coupling: f64, cohesion: f64, cycles: usize, god_objects: usize) -> f64 {
    let score = 10.0
        - coupling * 3.0
        - (1.0 - cohesion) * 2.0
        - (cycles as f64 * 0.5).min(3.0)
        - (god_objects as f64 * 0.3).min(2.0);
    score.clamp(1.0, 10.0)
}

/// Graph state the metrics are computed from.
struct Snapshot {
    /// Modules in scope, sorted by id.
    modules: Vec<Node>,
    edges: Vec<Edge>,
}

impl Snapshot {
    fn module_ids(&self) -> HashSet<&str> {
        self.modules.iter().map(|m| m.id.as_str()).collect()
    }

    fn outgoing_dependencies(&self, id: &str) -> usize {
        self.edges
            .iter()
            .filter(|e| e.kind.is_dependency() && e.source == id)
            .count()
    }

    fn incoming_dependencies(&self, id: &str) -> usize {
        self.edges
            .iter()
            .filter(|e| e.kind.is_dependency() && e.target == id)
            .count()
    }

    /// Callable ids owned by each module.
    fn owned_callables(&self) -> HashMap<&str, HashSet<&str>> {
        let mut owned: HashMap<&str, HashSet<&str>> = HashMap::new();
        for edge in &self.edges {
            if edge.kind == EdgeKind::Owns {
                owned
                    .entry(edge.source.as_str())
                    .or_default()
                    .insert(edge.target.as_str());
            }
        }
        owned
    }

    /// A ceiling that is not a positive finite number counts as 1.0.
    fn coupling(&self, ceiling: f64) -> f64 {
        if self.modules.is_empty() {
            return 0.0;
        }
        let ceiling = if ceiling.is_finite() && ceiling > 0.0 {
            ceiling
        } else {
            1.0
        };
        let total: usize = self
            .modules
            .iter()
            .map(|m| self.outgoing_dependencies(&m.id))
            .sum();
        let mean = total as f64 / self.modules.len() as f64;
        (mean / ceiling).clamp(0.0, 1.0)
    }

    fn cohesion(&self) -> f64 {
        let owned = self.owned_callables();
        let empty = HashSet::new();
        let mut ratios = Vec::new();

        for module in &self.modules {
            let callables = owned.get(module.id.as_str()).unwrap_or(&empty);
            let mut total = 0usize;
            let mut internal = 0usize;
            for edge in &self.edges {
                if edge.kind == EdgeKind::Calls && callables.contains(edge.source.as_str()) {
                    total += 1;
                    if callables.contains(edge.target.as_str()) {
                        internal += 1;
                    }
                }
            }
            if total > 0 {
                ratios.push((internal as f64 / total as f64).min(1.0));
            }
        }

        if ratios.is_empty() {
            1.0
        } else {
            ratios.iter().sum::<f64>() / ratios.len() as f64
        }
    }

    fn adjacency(&self, scoped: bool) -> Adjacency {
        if scoped {
            dependency_adjacency(&self.edges, Some(&self.module_ids()))
        } else {
            dependency_adjacency(&self.edges, None)
        }
    }

    fn god_objects(&self, config: &AnalysisConfig) -> Vec<GodObject> {
        let owned = self.owned_callables();
        let mut gods: Vec<GodObject> = self
            .modules
            .iter()
            .filter_map(|module| {
                let callables = owned.get(module.id.as_str()).map_or(0, HashSet::len);
                let outgoing = self.outgoing_dependencies(&module.id);
                let incoming = self.incoming_dependencies(&module.id);

                let flagged = callables > config.god_callables
                    || outgoing > config.god_outgoing
                    || incoming > config.god_incoming;

                flagged.then(|| GodObject {
                    module_id: module.id.clone(),
                    display_name: module.display_name.clone(),
                    callables,
                    outgoing_dependencies: outgoing,
                    incoming_dependencies: incoming,
                    score: callables + outgoing + incoming,
                })
            })
            .collect();

        gods.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.module_id.cmp(&b.module_id)));
        gods
    }

    fn orphans(&self) -> Vec<String> {
        let connected: HashSet<&str> = self
            .edges
            .iter()
            .flat_map(|e| [e.source.as_str(), e.target.as_str()])
            .collect();

        self.modules
            .iter()
            .filter(|m| !connected.contains(m.id.as_str()))
            .map(|m| m.id.clone())
            .collect()
    }
}

/// Architecture metrics over a graph backend.
pub struct ArchitectureAnalyzer {
    backend: Arc<dyn GraphBackend>,
    config: AnalysisConfig,
    configuration: Option<String>,
}

impl ArchitectureAnalyzer {
    pub fn new(backend: Arc<dyn GraphBackend>) -> Self {
        Self {
            backend,
            config: AnalysisConfig::default(),
            configuration: None,
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Restrict the analysis to modules of one configuration.
    pub fn scoped(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    async fn snapshot(&self) -> Result<Snapshot, GraphError> {
        let mut filter = NodeFilter::kind(NodeKind::Module);
        if let Some(configuration) = &self.configuration {
            filter = filter.with_prop("configuration", configuration.clone());
        }

        let mut modules = self.backend.find_nodes(&filter).await?;
        modules.sort_by(|a, b| a.id.cmp(&b.id));
        let edges = self.backend.edges().await?;
        Ok(Snapshot { modules, edges })
    }

    /// Mean outgoing dependency edges per module over the ceiling, in `[0, 1]`.
    pub async fn coupling_score(&self) -> Result<f64, GraphError> {
        Ok(self.snapshot().await?.coupling(self.config.coupling_ceiling))
    }

    /// Mean share of intra-module calls, in `[0, 1]`. 1.0 when nothing calls.
    pub async fn cohesion_score(&self) -> Result<f64, GraphError> {
        Ok(self.snapshot().await?.cohesion())
    }

    pub async fn find_cycles(&self) -> Result<Vec<Cycle>, GraphError> {
        let snapshot = self.snapshot().await?;
        let adjacency = snapshot.adjacency(self.configuration.is_some());
        Ok(find_cycles(&adjacency, self.config.max_cycle_length))
    }

    /// Cycles passing through one node.
    pub async fn cycles_from(&self, node_id: &str) -> Result<Vec<Cycle>, GraphError> {
        let snapshot = self.snapshot().await?;
        let adjacency = snapshot.adjacency(self.configuration.is_some());
        Ok(cycles_through(&adjacency, node_id, self.config.max_cycle_length))
    }

    /// Flagged modules, highest score first.
    pub async fn god_objects(&self) -> Result<Vec<GodObject>, GraphError> {
        Ok(self.snapshot().await?.god_objects(&self.config))
    }

    pub async fn orphan_modules(&self) -> Result<Vec<String>, GraphError> {
        Ok(self.snapshot().await?.orphans())
    }

    /// Run every metric on one snapshot of the graph.
    pub async fn analyze(&self) -> Result<ArchitectureReport, GraphError> {
        let snapshot = self.snapshot().await?;

        let coupling = snapshot.coupling(self.config.coupling_ceiling);
        let cohesion = snapshot.cohesion();
        let cycles = find_cycles(
            &snapshot.adjacency(self.configuration.is_some()),
            self.config.max_cycle_length,
        );
        let god_objects = snapshot.god_objects(&self.config);
        let orphans = snapshot.orphans();
        let score = composite_score(coupling, cohesion, cycles.len(), god_objects.len());

        let recommendations = recommend(
            &Findings {
                coupling,
                cohesion,
                cycles: &cycles,
                god_objects: &god_objects,
                orphans: &orphans,
            },
            &self.config,
        );

        info!(
            modules = snapshot.modules.len(),
            coupling,
            cohesion,
            cycles = cycles.len(),
            god_objects = god_objects.len(),
            score,
            "architecture analyzed"
        );

        Ok(ArchitectureReport {
            configuration: self.configuration.clone(),
            modules: snapshot.modules.len(),
            coupling,
            cohesion,
            cycles,
            god_objects,
            orphans,
            score,
            recommendations,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_score_bounds() {
        assert_eq!(composite_score(0.0, 1.0, 0, 0), 10.0);
        assert_eq!(composite_score(1.0, 0.0, 100, 100), 1.0);
        let score = composite_score(0.5, 0.5, 2, 1);
        assert!((score - (10.0 - 1.5 - 1.0 - 1.0 - 0.3)).abs() < 1e-9);
    }

    #[test]
    fn test_coupling_ceiling_guard() {
        let snapshot = Snapshot {
            modules: vec![
                Node::new(NodeKind::Module, "A", "A"),
                Node::new(NodeKind::Module, "B", "B"),
            ],
            edges: vec![Edge::new("module:A", "module:B", EdgeKind::DependsOn)],
        };

        for ceiling in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert_eq!(snapshot.coupling(ceiling), 0.5);
        }
        assert_eq!(snapshot.coupling(10.0), 0.05);
    }

    #[test]
    fn test_penalties_saturate() {
        let few = composite_score(0.0, 1.0, 6, 0);
        let many = composite_score(0.0, 1.0, 60, 0);
        assert_eq!(few, many);
        assert_eq!(few, 7.0);
    }
}
