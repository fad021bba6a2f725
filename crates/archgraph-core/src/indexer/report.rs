//! Ingestion reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What one `build_module` call wrote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub module_id: String,
    pub callables: usize,
    pub queries: usize,
    pub tables: usize,
    /// Calls resolved to a callable of the same module.
    pub resolved_calls: usize,
    /// Calls routed to an external placeholder.
    pub external_calls: usize,
    pub nodes_created: usize,
    pub edges_created: usize,
}

/// Outcome of one file in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Parsed and fully written.
    Ingested,
    /// Parse failed; only the module node was written.
    Degraded,
    /// Could not be read; nothing was written.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: String,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    pub nodes_created: usize,
    pub edges_created: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn ingested(path: impl Into<String>, module: &ModuleReport) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Ingested,
            module_id: Some(module.module_id.clone()),
            nodes_created: module.nodes_created,
            edges_created: module.edges_created,
            error: None,
        }
    }

    pub fn degraded(path: impl Into<String>, module_id: String, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Degraded,
            module_id: Some(module_id),
            nodes_created: 1,
            edges_created: 0,
            error: Some(error.into()),
        }
    }

    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Failed,
            module_id: None,
            nodes_created: 0,
            edges_created: 0,
            error: Some(error.into()),
        }
    }

    /// Ingested and degraded files both count as processed.
    pub fn is_processed(&self) -> bool {
        self.status != FileStatus::Failed
    }
}

/// Aggregate result of a directory ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryReport {
    pub root: String,
    pub files_seen: usize,
    pub files_processed: usize,
    pub files_degraded: usize,
    pub files_failed: usize,
    pub nodes_created: usize,
    pub edges_created: usize,
    /// Module dependencies added by the cross-module link pass.
    pub dependencies_linked: usize,
    pub files: Vec<FileReport>,
    pub finished_at: DateTime<Utc>,
}

impl DirectoryReport {
    pub fn from_files(
        root: impl Into<String>,
        files: Vec<FileReport>,
        dependencies_linked: usize,
    ) -> Self {
        let count = |status: FileStatus| files.iter().filter(|f| f.status == status).count();

        Self {
            root: root.into(),
            files_seen: files.len(),
            files_processed: files.iter().filter(|f| f.is_processed()).count(),
            files_degraded: count(FileStatus::Degraded),
            files_failed: count(FileStatus::Failed),
            nodes_created: files.iter().map(|f| f.nodes_created).sum(),
            edges_created: files.iter().map(|f| f.edges_created).sum::<usize>()
                + dependencies_linked,
            dependencies_linked,
            files,
            finished_at: Utc::now(),
        }
    }
}
