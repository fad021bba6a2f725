//! Core parser trait for turning source files into parsed modules.

use super::module::ParsedModule;

/// Source-language parser.
///
/// Implementations wrap a real grammar for some language and report what a
/// module defines:
///
/// 1. **Callables**: functions and procedures with spans and bodies
/// 2. **Variables**: module-level declarations
/// 3. **Queries**: embedded query text with a coarse type
///
/// # Example Implementation
///
/// ```ignore
/// impl ModuleParser for BslParser {
///     fn parse_module(&self, path: &str, content: &str) -> Result<ParsedModule, String> {
///         let tree = self.grammar.parse(content)?;
///         // Walk the tree and collect callables, variables and queries...
///     }
///
///     fn language_name(&self) -> &'static str { "BSL" }
///     fn supported_extensions(&self) -> &[&'static str] { &["bsl", "os"] }
/// }
/// ```
pub trait ModuleParser: Send + Sync {
    /// Parse a source file.
    ///
    /// # Arguments
    /// * `path` - Path of the file relative to the ingestion root
    /// * `content` - File content
    ///
    /// # Returns
    /// * `Ok(ParsedModule)` - What the module defines
    /// * `Err(String)` - Parse error message
    fn parse_module(&self, path: &str, content: &str) -> Result<ParsedModule, String>;

    /// Human-readable language name.
    fn language_name(&self) -> &'static str;

    /// File extensions this parser handles.
    fn supported_extensions(&self) -> &[&'static str];

    /// Check if this parser can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
