use std::sync::Arc;

use archgraph_core::graph::export::export_graph;
use archgraph_core::graph::{GraphBackend, GraphDocument, InMemoryGraph, SurrealGraphStore};
use archgraph_core::indexer::{CodeGraphBuilder, ModuleMetadata};
use archgraph_core::metadata::{Element, MetadataDocument, MetadataIngestor};
use archgraph_core::parser::{ParsedCallable, ParsedModule, ParsedQuery};

fn callable(name: &str, body: &str, is_export: bool) -> ParsedCallable {
    ParsedCallable {
        name: name.to_string(),
        is_export,
        body: body.to_string(),
        start_line: 1,
        end_line: 6,
        ..ParsedCallable::default()
    }
}

fn catalog(name: &str) -> Element {
    Element::new("MetaDataObject").with_child(
        Element::new("Catalog")
            .with_child(Element::new("Properties").with_child(Element::leaf("Name", name))),
    )
}

fn subsystem(name: &str, item: &str) -> Element {
    Element::new("MetaDataObject").with_child(
        Element::new("Subsystem").with_child(
            Element::new("Properties")
                .with_child(Element::leaf("Name", name))
                .with_child(Element::new("Content").with_child(Element::leaf("xr:Item", item))),
        ),
    )
}

/// Code, metadata and module links for a small two-module system.
async fn populate(backend: Arc<dyn GraphBackend>) {
    let sales = ParsedModule {
        procedures: vec![callable("Post", "Reserve(Doc);", true)],
        queries: vec![ParsedQuery {
            text: "SELECT Name FROM Catalog.Goods".to_string(),
            query_type: "SELECT".to_string(),
            line: 3,
        }],
        ..ParsedModule::default()
    };
    let stock = ParsedModule {
        functions: vec![callable("Reserve", "", true)],
        ..ParsedModule::default()
    };
    let meta = ModuleMetadata::for_configuration("Trade");

    let mut builder = CodeGraphBuilder::new(backend.clone());
    builder.build_module("Sales", &sales, &meta).await.unwrap();
    builder.build_module("Stock", &stock, &meta).await.unwrap();
    assert_eq!(builder.link_modules().await.unwrap(), 1);

    let documents = vec![
        MetadataDocument::new("Subsystems/Retail.xml", subsystem("Retail", "Catalog.Goods")),
        MetadataDocument::new("Catalogs/Goods.xml", catalog("Goods")),
    ];
    let report = MetadataIngestor::new(backend).ingest(&documents).await.unwrap();
    assert_eq!(report.containment_edges, 1);
}

#[tokio::test]
async fn test_surreal_store_matches_in_memory_graph() {
    let memory: Arc<dyn GraphBackend> = Arc::new(InMemoryGraph::new());
    let surreal: Arc<dyn GraphBackend> = Arc::new(SurrealGraphStore::memory().await.unwrap());
    populate(memory.clone()).await;
    populate(surreal.clone()).await;

    let expected = export_graph(memory.as_ref()).await.unwrap();
    let actual = export_graph(surreal.as_ref()).await.unwrap();
    assert!(!expected.nodes.is_empty());
    assert_eq!(actual.nodes, expected.nodes);
    assert_eq!(actual.edges, expected.edges);
    assert_eq!(surreal.stats().await.unwrap(), memory.stats().await.unwrap());
}

#[tokio::test]
async fn test_export_replays_into_fresh_surreal_store() {
    let source: Arc<dyn GraphBackend> = Arc::new(InMemoryGraph::new());
    populate(source.clone()).await;
    let json = export_graph(source.as_ref()).await.unwrap().to_json().unwrap();

    let target = SurrealGraphStore::memory().await.unwrap();
    let stats = GraphDocument::from_json(&json)
        .unwrap()
        .replay(&target)
        .await
        .unwrap();
    assert_eq!(stats, source.stats().await.unwrap());
    assert_eq!(target.stats().await.unwrap(), stats);

    // Replaying twice changes nothing.
    GraphDocument::from_json(&json)
        .unwrap()
        .replay(&target)
        .await
        .unwrap();
    assert_eq!(target.stats().await.unwrap(), stats);
}
