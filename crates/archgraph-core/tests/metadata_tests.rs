use std::fs;
use std::sync::Arc;

use archgraph_core::graph::{EdgeKind, GraphBackend, InMemoryGraph, NodeKind};
use archgraph_core::metadata::{Element, MetadataDocument, MetadataIngestor};
use tempfile::TempDir;

fn subsystem(name: &str, content: &[&str]) -> Element {
    let mut items = Element::new("Content");
    for item in content {
        items = items.with_child(Element::leaf("xr:Item", *item));
    }
    Element::new("MetaDataObject").with_child(
        Element::new("Subsystem").with_child(
            Element::new("Properties")
                .with_child(Element::leaf("Name", name))
                .with_child(items),
        ),
    )
}

fn object(tag: &str, name: &str) -> Element {
    Element::new("MetaDataObject").with_child(
        Element::new(tag)
            .with_child(Element::new("Properties").with_child(Element::leaf("Name", name))),
    )
}

#[tokio::test]
async fn test_subsystem_contains_catalog_once() {
    let graph = Arc::new(InMemoryGraph::new());
    let ingestor = MetadataIngestor::new(graph.clone());

    // The subsystem comes first; containment must still resolve.
    let documents = vec![
        MetadataDocument::new(
            "Subsystems/Sales.xml",
            subsystem("Sales", &["Catalog.Goods", "Catalog.Goods", "Document.Missing"]),
        ),
        MetadataDocument::new("Catalogs/Goods.xml", object("Catalog", "Goods")),
        MetadataDocument::new("Broken.xml", Element::new("MetaDataObject")),
    ];

    let report = ingestor.ingest(&documents).await.unwrap();
    assert_eq!(report.documents_seen, 3);
    assert_eq!(report.objects_ingested, 2);
    assert_eq!(report.containment_edges, 1);
    assert_eq!(report.unresolved_references, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, "Broken.xml");

    let edges = graph.edges().await.unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, EdgeKind::Contains);
    assert_eq!(edges[0].source, "subsystem:Sales");
    assert_eq!(edges[0].target, "catalog:Goods");

    let catalog = graph.get_node("catalog:Goods").await.unwrap().unwrap();
    assert_eq!(catalog.kind, NodeKind::Catalog);
    assert!(catalog.has_label("metadata"));
    assert_eq!(catalog.prop_str("source"), Some("Catalogs/Goods.xml"));
}

#[tokio::test]
async fn test_shared_bare_name_stays_unresolved() {
    let graph = Arc::new(InMemoryGraph::new());
    let documents = vec![
        MetadataDocument::new("Catalogs/Goods.xml", object("Catalog", "Goods")),
        MetadataDocument::new("Documents/Goods.xml", object("Document", "Goods")),
        MetadataDocument::new(
            "Subsystems/Sales.xml",
            subsystem("Sales", &["Goods", "Catalog.Goods"]),
        ),
    ];

    let report = MetadataIngestor::new(graph.clone())
        .ingest(&documents)
        .await
        .unwrap();
    assert_eq!(report.objects_ingested, 3);
    assert_eq!(report.unresolved_references, 1);
    assert_eq!(report.containment_edges, 1);

    let edges = graph.edges().await.unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source, "subsystem:Sales");
    assert_eq!(edges[0].target, "catalog:Goods");
}

#[tokio::test]
async fn test_reingesting_does_not_duplicate() {
    let graph = Arc::new(InMemoryGraph::new());
    let ingestor = MetadataIngestor::new(graph.clone());
    let documents = vec![
        MetadataDocument::new("a", subsystem("Sales", &["Catalog.Goods"])),
        MetadataDocument::new("b", object("Catalog", "Goods")),
    ];

    ingestor.ingest(&documents).await.unwrap();
    ingestor.ingest(&documents).await.unwrap();

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
}

#[tokio::test]
async fn test_unmapped_tag_becomes_generic_object() {
    let graph = Arc::new(InMemoryGraph::new());
    let ingestor = MetadataIngestor::new(graph.clone());
    let documents = vec![MetadataDocument::new(
        "SessionParameters/CurrentUser.xml",
        object("SessionParameter", "CurrentUser"),
    )];

    ingestor.ingest(&documents).await.unwrap();
    let node = graph
        .get_node("metadata_object:SessionParameter.CurrentUser")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(node.kind, NodeKind::MetadataObject);
}

#[tokio::test]
async fn test_directory_records_malformed_files() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("Catalogs")).unwrap();
    fs::write(
        dir.path().join("Catalogs").join("Goods.json"),
        serde_json::to_string(&object("Catalog", "Goods")).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.path().join("Sales.json"),
        serde_json::to_string(&subsystem("Sales", &["Catalog.Goods"])).unwrap(),
    )
    .unwrap();
    fs::write(dir.path().join("Broken.json"), "[1, 2").unwrap();

    let graph = Arc::new(InMemoryGraph::new());
    let report = MetadataIngestor::new(graph.clone())
        .ingest_directory(dir.path())
        .await
        .unwrap();

    assert_eq!(report.documents_seen, 3);
    assert_eq!(report.objects_ingested, 2);
    assert_eq!(report.containment_edges, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].source, "Broken.json");

    let catalog = graph.get_node("catalog:Goods").await.unwrap().unwrap();
    assert_eq!(catalog.prop_str("source"), Some("Catalogs/Goods.json"));
}
