//! Parser for modules already parsed into JSON.

use super::module::ParsedModule;
use super::traits::ModuleParser;

/// Reads `.json` dumps of [`ParsedModule`] produced by an external parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonModuleParser;

impl JsonModuleParser {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleParser for JsonModuleParser {
    fn parse_module(&self, _path: &str, content: &str) -> Result<ParsedModule, String> {
        let module: ParsedModule = serde_json::from_str(content).map_err(|e| e.to_string())?;
        module.validate()?;
        Ok(module)
    }

    fn language_name(&self) -> &'static str {
        "JSON module dump"
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["json"]
    }
}
