//! SurrealDB-backed persistent graph store.
//!
//! Nodes live in one `graph_node` table keyed by `type::thing('graph_node', id)`.
//! Edges live in one RELATION table per edge kind, named by the kind token.
//! Table names are the only dynamic tokens spliced into query text and they
//! pass [`sanitize_identifier`] first; every value is a bound parameter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use tracing::{debug, info};

use super::error::GraphError;
use super::models::{Edge, Node, NodeFilter, Props};
use super::ontology::{EdgeKind, NodeKind};
use super::GraphBackend;
use crate::config::GraphConfig;

/// Node table name.
pub const NODE_TABLE: &str = "graph_node";

/// Identifier used when a dynamic kind token fails validation.
pub const FALLBACK_IDENTIFIER: &str = "related_to";

/// Validate a token that must appear verbatim in query text.
///
/// Accepts `^[A-Za-z_][A-Za-z0-9_]*$`. Anything else is replaced by
/// [`FALLBACK_IDENTIFIER`]; the write still goes ahead.
pub fn sanitize_identifier(raw: &str) -> Cow<'_, str> {
    let mut chars = raw.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Cow::Borrowed(raw)
    } else {
        debug!(token = raw, "substituting fallback identifier");
        Cow::Borrowed(FALLBACK_IDENTIFIER)
    }
}

/// Stored shape of a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeRecord {
    node_id: String,
    kind: String,
    display_name: String,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    props: Props,
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        Self {
            node_id: node.id,
            kind: node.kind.as_str().to_string(),
            display_name: node.display_name,
            labels: node.labels,
            props: node.props,
        }
    }
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        Self {
            id: record.node_id,
            kind: NodeKind::from_token(&record.kind),
            display_name: record.display_name,
            labels: record.labels,
            props: record.props,
        }
    }
}

/// Stored shape of an edge, as read back.
#[derive(Debug, Deserialize)]
struct EdgeRecord {
    source: Option<String>,
    target: Option<String>,
    edge_kind: String,
    #[serde(default)]
    props: Props,
}

#[derive(Debug, Deserialize)]
struct EdgeAck {
    #[allow(dead_code)]
    edge_kind: String,
}

const NODE_FIELDS: &str = "node_id, kind, display_name, labels, props";

/// Persistent graph store on SurrealDB.
pub struct SurrealGraphStore {
    db: Surreal<Any>,
    timeout: Duration,
}

impl SurrealGraphStore {
    /// Connect to the configured endpoint (`mem://`, `rocksdb://path`, `ws://host`).
    ///
    /// Connection failure is reported as [`GraphError::Unavailable`].
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let unavailable = |message: String| GraphError::Unavailable {
            endpoint: config.endpoint.clone(),
            message,
        };

        let db = match tokio::time::timeout(timeout, any::connect(config.endpoint.clone())).await {
            Ok(Ok(db)) => db,
            Ok(Err(e)) => return Err(unavailable(e.to_string())),
            Err(_) => return Err(unavailable("connection timed out".to_string())),
        };

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        }

        db.use_ns(config.namespace.clone())
            .use_db(config.database.clone())
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        info!(endpoint = %config.endpoint, "connected to graph store");
        Ok(Self { db, timeout })
    }

    /// Open a throwaway in-memory store with the schema in place.
    pub async fn memory() -> Result<Self, GraphError> {
        let config = GraphConfig {
            endpoint: "mem://".to_string(),
            ..GraphConfig::default()
        };
        let store = Self::connect(&config).await?;
        store.initialize_schema().await?;
        Ok(store)
    }

    /// Define node and relation tables. Safe to run repeatedly.
    pub async fn initialize_schema(&self) -> Result<(), GraphError> {
        let mut statements = vec![
            format!("DEFINE TABLE IF NOT EXISTS {NODE_TABLE} SCHEMALESS;"),
            format!("DEFINE INDEX IF NOT EXISTS {NODE_TABLE}_kind ON {NODE_TABLE} FIELDS kind;"),
            format!(
                "DEFINE INDEX IF NOT EXISTS {NODE_TABLE}_node_id ON {NODE_TABLE} \
                 FIELDS node_id UNIQUE;"
            ),
        ];

        for kind in EdgeKind::ALL {
            let table = Self::relation_table(kind.as_str());
            statements.push(format!(
                "DEFINE TABLE IF NOT EXISTS {table} TYPE RELATION \
                 IN {NODE_TABLE} OUT {NODE_TABLE} SCHEMALESS;"
            ));
            statements.push(format!(
                "DEFINE INDEX IF NOT EXISTS {table}_in ON {table} FIELDS in;"
            ));
        }

        self.execute(&statements.join("\n"), BTreeMap::new()).await?;
        Ok(())
    }

    /// Run a query template with bound parameters.
    ///
    /// This is the raw entry point behind every typed operation. Never format
    /// untrusted values into `template`; pass them in `params`.
    pub async fn execute(
        &self,
        template: &str,
        params: BTreeMap<String, Value>,
    ) -> Result<Response, GraphError> {
        let mut query = self.db.query(template);
        for (name, value) in params {
            query = query.bind((name, value));
        }

        let response = match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(GraphError::Timeout {
                    operation: "query",
                    seconds: self.timeout.as_secs(),
                })
            }
        };

        Ok(response.check()?)
    }

    /// Relation table for an edge kind token.
    fn relation_table(token: &str) -> Cow<'_, str> {
        sanitize_identifier(token)
    }

    fn params<const N: usize>(pairs: [(&str, Value); N]) -> BTreeMap<String, Value> {
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    fn props_value(props: Props) -> Value {
        Value::Object(props.into_iter().collect())
    }

    async fn nodes_by_ids(&self, ids: Vec<String>) -> Result<Vec<Node>, GraphError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!("SELECT {NODE_FIELDS} FROM {NODE_TABLE} WHERE node_id INSIDE $ids;");
        let ids = Value::Array(ids.into_iter().map(Value::String).collect());
        let mut response = self.execute(&query, Self::params([("ids", ids)])).await?;
        let records: Vec<NodeRecord> = response.take(0)?;
        Ok(records.into_iter().map(Node::from).collect())
    }
}

#[async_trait]
impl GraphBackend for SurrealGraphStore {
    fn backend_name(&self) -> &'static str {
        "surrealdb"
    }

    async fn upsert_node(&self, node: Node) -> Result<(), GraphError> {
        let id = node.id.clone();
        let record = serde_json::to_value(NodeRecord::from(node))?;
        let query = format!("UPSERT type::thing('{NODE_TABLE}', $id) CONTENT $record RETURN NONE;");

        self.execute(
            &query,
            Self::params([("id", Value::String(id)), ("record", record)]),
        )
        .await?;
        Ok(())
    }

    async fn upsert_edge(&self, edge: Edge) -> Result<(), GraphError> {
        let table = Self::relation_table(edge.kind.as_str());

        // Endpoint sub-selects come back empty for missing nodes, which makes
        // both the DELETE and the RELATE match nothing.
        let query = format!(
            "LET $src = (SELECT VALUE id FROM type::thing('{NODE_TABLE}', $source));
             LET $dst = (SELECT VALUE id FROM type::thing('{NODE_TABLE}', $target));
             DELETE {table} WHERE in INSIDE $src AND out INSIDE $dst;
             RELATE $src->{table}->$dst
                 CONTENT {{ edge_kind: $kind, props: $props }} RETURN edge_kind;"
        );

        let source = edge.source.clone();
        let target = edge.target.clone();
        let mut response = self
            .execute(
                &query,
                Self::params([
                    ("source", Value::String(edge.source)),
                    ("target", Value::String(edge.target)),
                    ("kind", Value::String(edge.kind.as_str().to_string())),
                    ("props", Self::props_value(edge.props)),
                ]),
            )
            .await?;

        let written: Vec<EdgeAck> = response.take(3)?;
        if written.is_empty() {
            debug!(%source, %target, %table, "edge endpoints not found, nothing stored");
        }
        Ok(())
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError> {
        let query = format!("SELECT {NODE_FIELDS} FROM type::thing('{NODE_TABLE}', $id);");
        let mut response = self
            .execute(&query, Self::params([("id", Value::String(id.to_string()))]))
            .await?;

        let records: Vec<NodeRecord> = response.take(0)?;
        Ok(records.into_iter().next().map(Node::from))
    }

    async fn neighbors(
        &self,
        id: &str,
        kinds: Option<&[EdgeKind]>,
    ) -> Result<Vec<Node>, GraphError> {
        let kinds = kinds.unwrap_or(EdgeKind::ALL);
        if kinds.is_empty() {
            return Ok(Vec::new());
        }

        let query = kinds
            .iter()
            .map(|kind| {
                format!(
                    "SELECT VALUE out.node_id FROM {} WHERE in = type::thing('{NODE_TABLE}', $id);",
                    Self::relation_table(kind.as_str())
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut response = self
            .execute(&query, Self::params([("id", Value::String(id.to_string()))]))
            .await?;

        let mut targets = BTreeSet::new();
        for index in 0..kinds.len() {
            let ids: Vec<Option<String>> = response.take(index)?;
            targets.extend(ids.into_iter().flatten());
        }

        self.nodes_by_ids(targets.into_iter().collect()).await
    }

    async fn find_nodes(&self, filter: &NodeFilter) -> Result<Vec<Node>, GraphError> {
        let mut conditions = Vec::new();
        let mut params = BTreeMap::new();

        if let Some(kind) = filter.kind {
            conditions.push("kind = $kind");
            params.insert("kind".to_string(), Value::String(kind.as_str().to_string()));
        }
        if let Some(label) = &filter.label {
            conditions.push("labels CONTAINS $label");
            params.insert("label".to_string(), Value::String(label.clone()));
        }

        let mut query = format!("SELECT {NODE_FIELDS} FROM {NODE_TABLE}");
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push(';');

        let mut response = self.execute(&query, params).await?;
        let records: Vec<NodeRecord> = response.take(0)?;

        // Property keys are caller-controlled, so they are matched here rather
        // than spliced into the query.
        Ok(records
            .into_iter()
            .map(Node::from)
            .filter(|node| filter.matches_attributes(node))
            .collect())
    }

    async fn edges(&self) -> Result<Vec<Edge>, GraphError> {
        let query = EdgeKind::ALL
            .iter()
            .map(|kind| {
                format!(
                    "SELECT in.node_id AS source, out.node_id AS target, edge_kind, props FROM {};",
                    Self::relation_table(kind.as_str())
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut response = self.execute(&query, BTreeMap::new()).await?;

        let mut edges = Vec::new();
        for index in 0..EdgeKind::ALL.len() {
            let records: Vec<EdgeRecord> = response.take(index)?;
            edges.extend(records.into_iter().filter_map(|record| {
                Some(Edge {
                    source: record.source?,
                    target: record.target?,
                    kind: EdgeKind::from_token(&record.edge_kind),
                    props: record.props,
                })
            }));
        }
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_accepts_identifiers() {
        assert_eq!(sanitize_identifier("calls"), "calls");
        assert_eq!(sanitize_identifier("_private9"), "_private9");
        assert_eq!(sanitize_identifier("reads_table"), "reads_table");
    }

    #[test]
    fn test_sanitize_substitutes_fallback() {
        assert_eq!(sanitize_identifier(""), FALLBACK_IDENTIFIER);
        assert_eq!(sanitize_identifier("9lives"), FALLBACK_IDENTIFIER);
        assert_eq!(sanitize_identifier("calls; REMOVE TABLE graph_node"), FALLBACK_IDENTIFIER);
        assert_eq!(sanitize_identifier("depends-on"), FALLBACK_IDENTIFIER);
        assert_eq!(sanitize_identifier("связь"), FALLBACK_IDENTIFIER);
    }

    #[test]
    fn test_every_edge_kind_is_a_valid_table() {
        for kind in EdgeKind::ALL {
            assert_eq!(SurrealGraphStore::relation_table(kind.as_str()), kind.as_str());
        }
    }

    #[test]
    fn test_record_conversion_keeps_unknown_kinds_readable() {
        let record = NodeRecord {
            node_id: "widget:x".to_string(),
            kind: "widget".to_string(),
            display_name: "x".to_string(),
            labels: vec![],
            props: Props::new(),
        };
        let node = Node::from(record);
        assert_eq!(node.kind, NodeKind::Unknown);
        assert_eq!(node.id, "widget:x");
    }
}
