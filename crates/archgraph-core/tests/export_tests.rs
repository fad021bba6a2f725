use archgraph_core::graph::{Edge, EdgeKind, GraphBackend, GraphDocument, Node, NodeKind};
use archgraph_core::ArchGraph;

async fn populated() -> ArchGraph {
    let graph = ArchGraph::in_memory();
    let backend = graph.backend();
    backend
        .upsert_node(Node::new(NodeKind::Module, "Sales", "Sales").with_prop("lines", 120))
        .await
        .unwrap();
    backend
        .upsert_node(Node::new(NodeKind::Procedure, "Sales:Post", "Post"))
        .await
        .unwrap();
    backend
        .upsert_node(Node::new(NodeKind::DatabaseTable, "Catalog.Goods", "Catalog.Goods"))
        .await
        .unwrap();
    backend
        .upsert_edge(Edge::new("module:Sales", "procedure:Sales:Post", EdgeKind::Owns))
        .await
        .unwrap();
    backend
        .upsert_edge(
            Edge::new("module:Sales", "table:Catalog.Goods", EdgeKind::ReadsTable)
                .with_prop("operation", "read"),
        )
        .await
        .unwrap();
    graph
}

#[tokio::test]
async fn test_export_import_keeps_counts() {
    let source = populated().await;
    let document = source.export().await.unwrap();
    assert_eq!(document.nodes.len(), 3);
    assert_eq!(document.edges.len(), 2);

    let json = document.to_json().unwrap();
    let restored = ArchGraph::in_memory();
    let stats = restored
        .import(&GraphDocument::from_json(&json).unwrap())
        .await
        .unwrap();
    assert_eq!(stats.nodes, 3);
    assert_eq!(stats.edges, 2);
    assert_eq!(restored.stats().await.unwrap(), source.stats().await.unwrap());

    let module = restored
        .backend()
        .get_node("module:Sales")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(module.prop_u64("lines"), Some(120));
}

#[tokio::test]
async fn test_export_is_sorted_and_stable() {
    let graph = populated().await;
    let first = graph.export().await.unwrap().to_yaml().unwrap();
    let second = graph.export().await.unwrap().to_yaml().unwrap();
    assert_eq!(first, second);

    let document = GraphDocument::from_yaml(&first).unwrap();
    let ids: Vec<&str> = document.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["module:Sales", "procedure:Sales:Post", "table:Catalog.Goods"]);
}

#[tokio::test]
async fn test_import_drops_dangling_edges() {
    let document = GraphDocument::new(
        vec![Node::new(NodeKind::Module, "A", "A")],
        vec![Edge::new("module:A", "module:Gone", EdgeKind::DependsOn)],
    );
    let graph = ArchGraph::in_memory();
    graph.import(&document).await.unwrap();

    let stats = graph.stats().await.unwrap();
    assert_eq!(stats.nodes, 1);
    assert_eq!(stats.edges, 0);
}
