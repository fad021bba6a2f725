//! Parser registry for source-language parsers.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use super::json::JsonModuleParser;
use super::traits::ModuleParser;

/// Registry of module parsers.
///
/// Maps file extensions to their respective parsers.
/// The JSON dump parser is registered on creation.
pub struct ParserRegistry {
    /// Extension to parser mapping.
    parsers: HashMap<String, Arc<dyn ModuleParser>>,
}

impl ParserRegistry {
    /// Create a registry with the built-in parsers.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(JsonModuleParser::new()));
        registry
    }

    /// Create a registry with no parsers.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Register a parser for its supported extensions. Later registrations
    /// win for a shared extension.
    pub fn register(&mut self, parser: Arc<dyn ModuleParser>) {
        for ext in parser.supported_extensions() {
            self.parsers.insert(ext.to_lowercase(), Arc::clone(&parser));
        }
    }

    /// Get a parser for the given file extension.
    pub fn parser_for_extension(&self, extension: &str) -> Option<Arc<dyn ModuleParser>> {
        self.parsers.get(&extension.to_lowercase()).cloned()
    }

    /// Get a parser for the given file path.
    pub fn parser_for_path(&self, path: &Path) -> Option<Arc<dyn ModuleParser>> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.parser_for_extension(ext))
    }

    /// Check if any parser can handle the given extension.
    pub fn can_parse(&self, extension: &str) -> bool {
        self.parsers.contains_key(&extension.to_lowercase())
    }

    /// Keep only the given extensions.
    pub fn restrict_to(&mut self, extensions: &[String]) {
        let allowed: HashSet<String> = extensions.iter().map(|e| e.to_lowercase()).collect();
        self.parsers.retain(|ext, _| allowed.contains(ext));
    }

    /// List all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.parsers.keys().map(|s| s.as_str()).collect();
        extensions.sort_unstable();
        extensions
    }

    /// List all registered parsers with their extensions.
    pub fn list_parsers(&self) -> Vec<(&str, &[&'static str])> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for parser in self.parsers.values() {
            let name = parser.language_name();
            if seen.insert(name) {
                result.push((name, parser.supported_extensions()));
            }
        }

        result
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
