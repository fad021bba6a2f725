//! Code indexing for the architecture graph.
//!
//! Turns parsed modules into module, callable, query and table nodes with
//! ownership, call and data-access edges. Call targets and table names come
//! from a [`ReferenceExtractor`]; the default one is regex based.

mod builder;
mod extractor;
mod patterns;
mod report;

pub use builder::{callable_id, query_hash, CodeGraphBuilder, ModuleMetadata};
pub use extractor::{CallSite, ReferenceExtractor, RegexExtractor};
pub use patterns::{DEFAULT_EXCLUDE_DIRS, DEFAULT_EXTENSIONS};
pub use report::{DirectoryReport, FileReport, FileStatus, ModuleReport};
