//! Edge kinds (relationships) for the architecture graph.
//!
//! - **Structural**: OWNS, CONTAINS
//! - **Behavioral**: CALLS, EXECUTES_QUERY
//! - **Data access**: READS_TABLE, WRITES_TABLE
//! - **Dependency**: DEPENDS_ON, IMPORTS, REFERENCES, EXTENDS

use serde::{Deserialize, Serialize};
use std::fmt;

use super::EdgeCategory;

/// The kind of an edge. Edges merge on `(source, target, kind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Module owns a function or procedure
    Owns,
    /// A depends on B (module depends on module)
    DependsOn,
    /// Callable calls callable (or an external placeholder)
    Calls,
    /// Query reads a table
    ReadsTable,
    /// Query writes a table
    WritesTable,
    /// Module executes an embedded query
    ExecutesQuery,
    /// Metadata object contains another (subsystem contents)
    Contains,
    /// A references B by name
    References,
    /// A extends B
    Extends,
    /// A imports B
    Imports,
    /// Fallback for unrecognized kind tokens
    #[serde(other)]
    RelatedTo,
}

impl EdgeKind {
    /// Every kind, in declaration order.
    pub const ALL: &'static [EdgeKind] = &[
        Self::Owns,
        Self::DependsOn,
        Self::Calls,
        Self::ReadsTable,
        Self::WritesTable,
        Self::ExecutesQuery,
        Self::Contains,
        Self::References,
        Self::Extends,
        Self::Imports,
        Self::RelatedTo,
    ];

    /// Edges that express a dependency between components. Coupling and
    /// cycle detection walk only these.
    pub const DEPENDENCY_FAMILY: &'static [EdgeKind] =
        &[Self::DependsOn, Self::Imports, Self::References, Self::Extends];

    /// Stable token used in stores and exported documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owns => "owns",
            Self::DependsOn => "depends_on",
            Self::Calls => "calls",
            Self::ReadsTable => "reads_table",
            Self::WritesTable => "writes_table",
            Self::ExecutesQuery => "executes_query",
            Self::Contains => "contains",
            Self::References => "references",
            Self::Extends => "extends",
            Self::Imports => "imports",
            Self::RelatedTo => "related_to",
        }
    }

    /// Parse a kind token. Unrecognized tokens become [`EdgeKind::RelatedTo`].
    pub fn from_token(token: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == token)
            .unwrap_or(Self::RelatedTo)
    }

    /// Get the category of this edge kind.
    pub fn category(&self) -> EdgeCategory {
        match self {
            Self::Owns | Self::Contains | Self::RelatedTo => EdgeCategory::Structural,
            Self::Calls | Self::ExecutesQuery => EdgeCategory::Behavioral,
            Self::ReadsTable | Self::WritesTable => EdgeCategory::DataAccess,
            Self::DependsOn | Self::Imports | Self::References | Self::Extends => {
                EdgeCategory::Dependency
            }
        }
    }

    /// Whether this kind belongs to the dependency family.
    pub fn is_dependency(&self) -> bool {
        Self::DEPENDENCY_FAMILY.contains(self)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_round_trip() {
        for kind in EdgeKind::ALL {
            assert_eq!(EdgeKind::from_token(kind.as_str()), *kind);
        }
    }

    #[test]
    fn test_unknown_token_falls_back() {
        assert_eq!(EdgeKind::from_token("LIKES"), EdgeKind::RelatedTo);
        let kind: EdgeKind = serde_json::from_str("\"likes\"").unwrap();
        assert_eq!(kind, EdgeKind::RelatedTo);
    }

    #[test]
    fn test_dependency_family() {
        assert!(EdgeKind::DependsOn.is_dependency());
        assert!(EdgeKind::Extends.is_dependency());
        assert!(!EdgeKind::Calls.is_dependency());
        assert!(!EdgeKind::Owns.is_dependency());
        assert_eq!(EdgeKind::ReadsTable.category(), EdgeCategory::DataAccess);
    }
}
