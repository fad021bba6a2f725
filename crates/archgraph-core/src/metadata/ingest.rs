//! Batch ingestion of metadata documents.

use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::element::{Element, MetadataDocument};
use super::object::MetadataObject;
use crate::graph::{Edge, EdgeKind, GraphBackend, GraphError};

/// A document that could not be turned into an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub source: String,
    pub error: String,
}

/// Result of one metadata batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataReport {
    pub documents_seen: usize,
    pub objects_ingested: usize,
    pub containment_edges: usize,
    /// Containment references that named no object of the batch.
    pub unresolved_references: usize,
    pub failures: Vec<DocumentFailure>,
    pub finished_at: DateTime<Utc>,
}

/// Lookup from `Kind.Name`, bare `Name` and uuid to node id. A key claimed by
/// two different nodes resolves to nothing.
#[derive(Default)]
struct NameIndex {
    entries: HashMap<String, Option<String>>,
}

impl NameIndex {
    fn insert(&mut self, key: &str, id: &str) {
        match self.entries.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(Some(id.to_string()));
            }
            Entry::Occupied(mut slot) => {
                if let Some(existing) = slot.get() {
                    if existing != id {
                        debug!(
                            key,
                            first = %existing,
                            second = id,
                            "ambiguous metadata name, references to it stay unresolved"
                        );
                        slot.insert(None);
                    }
                }
            }
        }
    }

    fn resolve(&self, reference: &str) -> Option<&str> {
        self.entries.get(reference.trim())?.as_deref()
    }
}

/// Turns configuration-export documents into metadata nodes and
/// containment edges.
pub struct MetadataIngestor {
    backend: Arc<dyn GraphBackend>,
}

impl MetadataIngestor {
    pub fn new(backend: Arc<dyn GraphBackend>) -> Self {
        Self { backend }
    }

    /// Ingest one batch.
    ///
    /// Every document is written first; containment is resolved afterwards
    /// against the whole batch, so order inside the batch does not matter.
    /// Bad documents are recorded in the report and skipped.
    pub async fn ingest(
        &self,
        documents: &[MetadataDocument],
    ) -> Result<MetadataReport, GraphError> {
        let mut failures = Vec::new();
        let mut objects = Vec::new();

        for document in documents {
            match MetadataObject::from_root(&document.root) {
                Ok(object) => objects.push((object, document.source.as_str())),
                Err(error) => {
                    warn!(source = %document.source, %error, "skipping metadata document");
                    failures.push(DocumentFailure {
                        source: document.source.clone(),
                        error,
                    });
                }
            }
        }

        let mut index = NameIndex::default();
        let mut ingested = BTreeSet::new();
        for (object, source) in &objects {
            let id = object.node_id();
            index.insert(&object.qualified_name(), &id);
            index.insert(&object.name, &id);
            if let Some(uuid) = &object.uuid {
                index.insert(uuid, &id);
            }

            self.backend.upsert_node(object.to_node(source)).await?;
            ingested.insert(id);
        }

        let mut edges = BTreeSet::new();
        let mut unresolved = 0;
        for (object, _) in &objects {
            let source_id = object.node_id();
            for reference in &object.content {
                match index.resolve(reference) {
                    Some(target) if target != source_id => {
                        edges.insert((source_id.clone(), target.to_string()));
                    }
                    Some(_) => {}
                    None => {
                        debug!(
                            object = %object.qualified_name(),
                            reference = %reference,
                            "unresolved containment reference"
                        );
                        unresolved += 1;
                    }
                }
            }
        }

        for (source, target) in &edges {
            self.backend
                .upsert_edge(Edge::new(source.clone(), target.clone(), EdgeKind::Contains))
                .await?;
        }

        let report = MetadataReport {
            documents_seen: documents.len(),
            objects_ingested: ingested.len(),
            containment_edges: edges.len(),
            unresolved_references: unresolved,
            failures,
            finished_at: Utc::now(),
        };

        info!(
            documents = report.documents_seen,
            objects = report.objects_ingested,
            contains = report.containment_edges,
            failed = report.failures.len(),
            "metadata batch ingested"
        );
        Ok(report)
    }

    /// Read every `.json` element tree under `root` and ingest them as one
    /// batch. Unreadable or malformed files are recorded as failures.
    pub async fn ingest_directory(&self, root: &Path) -> Result<MetadataReport, GraphError> {
        let mut documents = Vec::new();
        let mut failures = Vec::new();

        for file in Self::collect_files(root) {
            let source = file
                .strip_prefix(root)
                .unwrap_or(&file)
                .to_string_lossy()
                .replace('\\', "/");

            let parsed = fs::read_to_string(&file)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<Element>(&content).map_err(|e| e.to_string())
                });

            match parsed {
                Ok(element) => documents.push(MetadataDocument::new(source, element)),
                Err(error) => {
                    warn!(%source, %error, "failed to load metadata document");
                    failures.push(DocumentFailure { source, error });
                }
            }
        }

        let mut report = self.ingest(&documents).await?;
        report.documents_seen += failures.len();
        failures.append(&mut report.failures);
        report.failures = failures;
        Ok(report)
    }

    fn collect_files(root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .build()
            .flatten()
            .filter(|entry| entry.file_type().map_or(false, |t| t.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
            })
            .collect();
        files.sort();
        files
    }
}
