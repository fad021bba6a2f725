//! The parsed-module record handed to the graph builder.

use serde::{Deserialize, Serialize};

/// Everything a parser found in one source module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedModule {
    #[serde(default)]
    pub functions: Vec<ParsedCallable>,
    #[serde(default)]
    pub procedures: Vec<ParsedCallable>,
    /// Module-level variables. Only counted.
    #[serde(default)]
    pub variables: Vec<ParsedVariable>,
    #[serde(default)]
    pub queries: Vec<ParsedQuery>,
}

/// A function or procedure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedCallable {
    pub name: String,
    #[serde(default)]
    pub is_export: bool,
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Cyclomatic complexity estimate.
    #[serde(default = "default_complexity")]
    pub complexity: u32,
    #[serde(default)]
    pub start_line: u32,
    #[serde(default)]
    pub end_line: u32,
    #[serde(default)]
    pub has_documentation: bool,
    /// Body text, scanned for calls.
    #[serde(default)]
    pub body: String,
}

fn default_complexity() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedVariable {
    pub name: String,
    #[serde(default)]
    pub is_export: bool,
    #[serde(default)]
    pub line: u32,
}

/// An embedded query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub text: String,
    /// Statement type as reported by the parser, e.g. `SELECT`.
    #[serde(rename = "type", default)]
    pub query_type: String,
    #[serde(default)]
    pub line: u32,
}

/// Coarse access type of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Read,
    Write,
}

impl QueryKind {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

const READ_STATEMENTS: &[&str] = &["SELECT", "ВЫБРАТЬ"];

impl ParsedQuery {
    /// `SELECT` reads, anything else writes. Without a reported type the first
    /// word of the text decides.
    pub fn kind(&self) -> QueryKind {
        let declared = self.query_type.trim();
        let statement = if declared.is_empty() {
            self.text.split_whitespace().next().unwrap_or_default()
        } else {
            declared
        };

        let statement = statement.to_uppercase();
        if READ_STATEMENTS.contains(&statement.as_str()) {
            QueryKind::Read
        } else {
            QueryKind::Write
        }
    }
}

impl ParsedModule {
    pub fn callable_count(&self) -> usize {
        self.functions.len() + self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callable_count() == 0 && self.variables.is_empty() && self.queries.is_empty()
    }

    /// Reject records the builder cannot turn into nodes.
    pub fn validate(&self) -> Result<(), String> {
        for callable in self.functions.iter().chain(&self.procedures) {
            if !is_valid_name(&callable.name) {
                return Err(format!("invalid callable name '{}'", callable.name));
            }
            if callable.start_line > callable.end_line {
                return Err(format!(
                    "callable '{}' ends at line {} before it starts at line {}",
                    callable.name, callable.end_line, callable.start_line
                ));
            }
        }
        Ok(())
    }
}

/// Letters, digits and underscores, not starting with a digit. Any script.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callable(name: &str, start: u32, end: u32) -> ParsedCallable {
        ParsedCallable {
            name: name.to_string(),
            start_line: start,
            end_line: end,
            ..Default::default()
        }
    }

    #[test]
    fn test_query_kind() {
        let query = |text: &str, ty: &str| ParsedQuery {
            text: text.to_string(),
            query_type: ty.to_string(),
            line: 1,
        };
        assert_eq!(query("", "SELECT").kind(), QueryKind::Read);
        assert_eq!(query("", "select").kind(), QueryKind::Read);
        assert_eq!(query("", "UPDATE").kind(), QueryKind::Write);
        assert_eq!(query("ВЫБРАТЬ * ИЗ Справочник.Товары", "").kind(), QueryKind::Read);
        assert_eq!(query("INSERT INTO t VALUES (1)", "").kind(), QueryKind::Write);
    }

    #[test]
    fn test_validate() {
        let mut module = ParsedModule::default();
        assert!(module.validate().is_ok());

        module.functions.push(callable("ПолучитьЦену", 1, 5));
        assert!(module.validate().is_ok());

        module.procedures.push(callable("Broken", 9, 3));
        assert!(module.validate().is_err());

        module.procedures = vec![callable("1st", 1, 2)];
        assert!(module.validate().is_err());

        module.procedures = vec![callable("", 1, 2)];
        assert!(module.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "functions": [{"name": "Total", "body": "Return Sum(1);"}],
            "queries": [{"text": "SELECT 1", "type": "SELECT", "line": 4}]
        }"#;
        let module: ParsedModule = serde_json::from_str(json).unwrap();
        assert_eq!(module.functions[0].complexity, 1);
        assert!(module.procedures.is_empty());
        assert_eq!(module.queries[0].query_type, "SELECT");
        assert_eq!(module.callable_count(), 1);
    }
}
