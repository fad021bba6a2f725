//! Typed property graph of a source-code system, with architecture analysis.
//!
//! Metadata ingestion and the code graph builder write modules, callables,
//! queries, tables and metadata objects into a [`GraphBackend`]; the
//! architecture analyzer and export read it back.
//!
//! # Example
//!
//! ```ignore
//! use archgraph_core::{ArchGraph, Config};
//! use archgraph_core::indexer::ModuleMetadata;
//!
//! let graph = ArchGraph::open(Config::load()?).await?;
//! graph
//!     .code_builder()
//!     .ingest_directory("./src".as_ref(), &ModuleMetadata::for_configuration("Trade"))
//!     .await?;
//!
//! let report = graph.analyzer().scoped("Trade").analyze().await?;
//! println!("score {:.1}", report.score);
//! ```

pub mod analysis;
pub mod config;
pub mod graph;
pub mod indexer;
pub mod metadata;
pub mod parser;

pub use config::{BackendKind, Config, ConfigError};
pub use graph::{GraphBackend, GraphError};

use std::sync::Arc;
use tracing::info;

use analysis::ArchitectureAnalyzer;
use graph::export::export_graph;
use graph::{GraphDocument, GraphStats, InMemoryGraph, SurrealGraphStore};
use indexer::CodeGraphBuilder;
use metadata::MetadataIngestor;
use parser::ParserRegistry;

/// One architecture graph and the components that work on it.
///
/// The backend is chosen once and shared by every component handed out.
pub struct ArchGraph {
    backend: Arc<dyn GraphBackend>,
    config: Config,
}

impl ArchGraph {
    /// Graph over an explicit backend.
    pub fn with_backend(backend: Arc<dyn GraphBackend>, config: Config) -> Self {
        Self { backend, config }
    }

    /// Fresh in-memory graph with default settings.
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(InMemoryGraph::new()), Config::default())
    }

    /// Open the backend named by `config.graph`.
    ///
    /// The persistent store gets its schema defined on open.
    pub async fn open(config: Config) -> Result<Self, GraphError> {
        let backend: Arc<dyn GraphBackend> = match config.graph.backend {
            BackendKind::Memory => Arc::new(InMemoryGraph::new()),
            BackendKind::Surreal => {
                let store = SurrealGraphStore::connect(&config.graph).await?;
                store.initialize_schema().await?;
                Arc::new(store)
            }
        };

        info!(backend = backend.backend_name(), "graph opened");
        Ok(Self::with_backend(backend, config))
    }

    pub fn backend(&self) -> Arc<dyn GraphBackend> {
        Arc::clone(&self.backend)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builder for one ingestion run, limited to the configured extensions.
    pub fn code_builder(&self) -> CodeGraphBuilder {
        let mut registry = ParserRegistry::new();
        registry.restrict_to(&self.config.indexer.extensions);

        CodeGraphBuilder::new(self.backend())
            .with_registry(registry)
            .with_exclude_dirs(self.config.indexer.exclude_dirs.clone())
    }

    pub fn metadata_ingestor(&self) -> MetadataIngestor {
        MetadataIngestor::new(self.backend())
    }

    pub fn analyzer(&self) -> ArchitectureAnalyzer {
        ArchitectureAnalyzer::new(self.backend()).with_config(self.config.analysis.clone())
    }

    pub async fn export(&self) -> Result<GraphDocument, GraphError> {
        export_graph(self.backend.as_ref()).await
    }

    /// Replay a document into this graph.
    pub async fn import(&self, document: &GraphDocument) -> Result<GraphStats, GraphError> {
        document.replay(self.backend.as_ref()).await
    }

    pub async fn stats(&self) -> Result<GraphStats, GraphError> {
        self.backend.stats().await
    }
}
