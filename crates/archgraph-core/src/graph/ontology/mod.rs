//! Graph ontology.
//!
//! Defines the closed taxonomy of node and edge kinds for the architecture
//! graph. Kinds are plain enums with a stable snake_case token, so they
//! serialize identically to every backend and to exported documents.
//!
//! ## Modules
//!
//! - `nodes` - Node kinds: Code (Module, Function, Procedure), Data (Query,
//!   DatabaseTable), Metadata (Catalog, Document, Subsystem, ...)
//! - `edges` - Edge kinds: Structural (OWNS, CONTAINS), Behavioral (CALLS,
//!   EXECUTES_QUERY), DataAccess (READS_TABLE, WRITES_TABLE), Dependency
//!   (DEPENDS_ON, IMPORTS, REFERENCES, EXTENDS)
//!
//! Unknown kind tokens never fail deserialization: they collapse into
//! [`NodeKind::Unknown`] and [`EdgeKind::RelatedTo`].

pub mod edges;
pub mod nodes;

pub use edges::*;
pub use nodes::*;

use serde::{Deserialize, Serialize};

/// Categories of nodes for filtering and organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    /// Code entities (modules, callables, call placeholders)
    Code,
    /// Data access entities (queries, tables)
    Data,
    /// Configuration metadata objects
    Metadata,
    /// Anything the taxonomy does not recognize
    Other,
}

/// Categories of edges for filtering and organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCategory {
    /// Structural relationships (owns, contains)
    Structural,
    /// Behavioral relationships (calls, executes_query)
    Behavioral,
    /// Data access relationships (reads_table, writes_table)
    DataAccess,
    /// Dependency relationships (depends_on, imports, references, extends)
    Dependency,
}
