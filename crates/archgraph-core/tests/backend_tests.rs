use archgraph_core::graph::{
    Edge, EdgeKind, GraphBackend, InMemoryGraph, Node, NodeFilter, NodeKind, SurrealGraphStore,
};

fn module(name: &str) -> Node {
    Node::new(NodeKind::Module, name, name).with_label("code")
}

fn function(module: &str, name: &str) -> Node {
    Node::new(NodeKind::Function, &format!("{module}:{name}"), name)
        .with_label("code")
        .with_prop("module", format!("module:{module}"))
}

async fn node_upsert_is_idempotent(graph: &dyn GraphBackend) {
    graph.upsert_node(module("Sales")).await.unwrap();
    graph
        .upsert_node(module("Sales").with_prop("owner", "team-a"))
        .await
        .unwrap();

    let stored = graph.get_node("module:Sales").await.unwrap().unwrap();
    assert_eq!(stored.kind, NodeKind::Module);
    assert_eq!(stored.prop_str("owner"), Some("team-a"));
    assert_eq!(graph.stats().await.unwrap().nodes, 1);
    assert!(graph.get_node("module:Missing").await.unwrap().is_none());
}

async fn edge_upsert_is_idempotent(graph: &dyn GraphBackend) {
    graph.upsert_node(module("A")).await.unwrap();
    graph.upsert_node(module("B")).await.unwrap();

    let edge = Edge::new("module:A", "module:B", EdgeKind::DependsOn);
    graph.upsert_edge(edge.clone()).await.unwrap();
    graph.upsert_edge(edge.with_prop("weight", 2)).await.unwrap();

    let edges = graph.edges().await.unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source, "module:A");
    assert_eq!(edges[0].target, "module:B");
    assert_eq!(edges[0].kind, EdgeKind::DependsOn);
    assert_eq!(edges[0].props.get("weight"), Some(&serde_json::json!(2)));

    // Same endpoints, different kind: a separate edge.
    graph
        .upsert_edge(Edge::new("module:A", "module:B", EdgeKind::Imports))
        .await
        .unwrap();
    assert_eq!(graph.edges().await.unwrap().len(), 2);
}

async fn edge_with_missing_endpoint_is_dropped(graph: &dyn GraphBackend) {
    graph.upsert_node(module("A")).await.unwrap();

    graph
        .upsert_edge(Edge::new("module:A", "module:Ghost", EdgeKind::DependsOn))
        .await
        .unwrap();
    graph
        .upsert_edge(Edge::new("module:Ghost", "module:A", EdgeKind::DependsOn))
        .await
        .unwrap();

    assert!(graph.edges().await.unwrap().is_empty());
    assert!(graph.neighbors("module:A", None).await.unwrap().is_empty());
}

async fn neighbors_filter_by_kind(graph: &dyn GraphBackend) {
    graph.upsert_node(module("Sales")).await.unwrap();
    graph.upsert_node(module("Stock")).await.unwrap();
    graph.upsert_node(function("Sales", "Post")).await.unwrap();

    graph
        .upsert_edge(Edge::new("module:Sales", "function:Sales:Post", EdgeKind::Owns))
        .await
        .unwrap();
    graph
        .upsert_edge(Edge::new("module:Sales", "module:Stock", EdgeKind::DependsOn))
        .await
        .unwrap();

    let mut all: Vec<String> = graph
        .neighbors("module:Sales", None)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    all.sort();
    assert_eq!(all, vec!["function:Sales:Post", "module:Stock"]);

    let owned = graph
        .neighbors("module:Sales", Some(&[EdgeKind::Owns]))
        .await
        .unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, "function:Sales:Post");

    assert!(graph
        .neighbors("module:Sales", Some(&[EdgeKind::Calls]))
        .await
        .unwrap()
        .is_empty());
    assert!(graph.neighbors("module:Stock", None).await.unwrap().is_empty());
}

async fn find_nodes_matches_every_part(graph: &dyn GraphBackend) {
    graph
        .upsert_node(module("Sales").with_prop("configuration", "Trade"))
        .await
        .unwrap();
    graph
        .upsert_node(module("Payroll").with_prop("configuration", "HR"))
        .await
        .unwrap();
    graph.upsert_node(function("Sales", "Post")).await.unwrap();

    let modules = graph
        .find_nodes(&NodeFilter::kind(NodeKind::Module))
        .await
        .unwrap();
    assert_eq!(modules.len(), 2);

    let trade = graph
        .find_nodes(&NodeFilter::kind(NodeKind::Module).with_prop("configuration", "Trade"))
        .await
        .unwrap();
    assert_eq!(trade.len(), 1);
    assert_eq!(trade[0].id, "module:Sales");

    let code = graph
        .find_nodes(&NodeFilter::any().with_label("code"))
        .await
        .unwrap();
    assert_eq!(code.len(), 3);

    assert!(graph
        .find_nodes(&NodeFilter::kind(NodeKind::Catalog))
        .await
        .unwrap()
        .is_empty());
}

macro_rules! backend_tests {
    ($($name:ident),* $(,)?) => {
        mod memory {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let graph = InMemoryGraph::new();
                    super::$name(&graph).await;
                }
            )*
        }

        mod surreal {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let graph = SurrealGraphStore::memory().await.unwrap();
                    super::$name(&graph).await;
                }
            )*
        }
    };
}

backend_tests!(
    node_upsert_is_idempotent,
    edge_upsert_is_idempotent,
    edge_with_missing_endpoint_is_dropped,
    neighbors_filter_by_kind,
    find_nodes_matches_every_part,
);
