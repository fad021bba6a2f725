//! Graph error types.

use thiserror::Error;

/// Errors that can occur while building, storing or analyzing the graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The persistent store could not be reached. Always fatal to the caller.
    #[error("Graph store unavailable at {endpoint}: {message}")]
    Unavailable { endpoint: String, message: String },

    /// Database query error.
    #[error("Database error: {0}")]
    Database(String),

    /// A store call exceeded its time budget.
    #[error("Graph store operation '{operation}' timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },

    /// Document (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GraphError {
    /// Whether this error means the store itself is gone.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, GraphError::Unavailable { .. } | GraphError::Timeout { .. })
    }
}

impl From<surrealdb::Error> for GraphError {
    fn from(err: surrealdb::Error) -> Self {
        GraphError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for GraphError {
    fn from(err: serde_yaml::Error) -> Self {
        GraphError::Serialization(err.to_string())
    }
}
