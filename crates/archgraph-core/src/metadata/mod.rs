//! Metadata ingestion.
//!
//! A configuration export arrives as one element tree per object (already
//! parsed by the export reader). Each becomes a node of the kind its root
//! tag maps to, carrying name, synonyms, comment and nested collections.
//! Containment lists are resolved against the whole batch into `contains`
//! edges.

mod element;
mod ingest;
mod mapping;
mod object;

pub use element::{local_name, Element, MetadataDocument};
pub use ingest::{DocumentFailure, MetadataIngestor, MetadataReport};
pub use mapping::node_kind_for_tag;
pub use object::MetadataObject;
