//! Parsed-module input contract and the parsers that produce it.
//!
//! The graph builder never reads source text itself. A [`ModuleParser`] turns
//! a file into a [`ParsedModule`] (functions, procedures, variables and
//! embedded queries with their spans), and the [`ParserRegistry`] picks the
//! parser by file extension.
//!
//! ## Components
//!
//! - `ModuleParser` trait - common interface for source parsers
//! - `ParserRegistry` - maps file extensions to parsers
//! - `JsonModuleParser` - reads modules already parsed into JSON
//! - `ParsedModule` - the record every parser produces

mod json;
mod module;
mod registry;
mod traits;

pub use json::JsonModuleParser;
pub use module::{ParsedCallable, ParsedModule, ParsedQuery, ParsedVariable, QueryKind};
pub use registry::ParserRegistry;
pub use traits::ModuleParser;
