//! Reference extraction from callable bodies and query text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::patterns::{
    BUILTIN_PREFIXES, CALL_KEYWORDS, CALL_PATTERN, DEFINITION_KEYWORDS, TABLE_PATTERN,
};

static CALL_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(CALL_PATTERN).ok());
static TABLE_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(TABLE_PATTERN).ok());

/// A candidate call found in a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Callee name as written.
    pub name: String,
    /// 1-based line within the scanned text.
    pub line: u32,
}

/// Finds call targets and table names in text.
///
/// The graph builder only talks to this trait, so a parser-driven extractor
/// can replace the regex heuristics without touching graph construction.
pub trait ReferenceExtractor: Send + Sync {
    /// Candidate call sites in a callable body, in order of appearance.
    fn extract_calls(&self, body: &str) -> Vec<CallSite>;

    /// Table names referenced by a query, deduplicated, in order of appearance.
    fn extract_tables(&self, query_text: &str) -> Vec<String>;
}

/// Regex-based extractor.
///
/// Calls are `identifier (` matches outside comments and string literals,
/// minus reserved words, built-in routine prefixes and the callable's own
/// definition header. Tables are the tokens after FROM, JOIN, INTO, UPDATE
/// and their Russian counterparts.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexExtractor;

impl RegexExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceExtractor for RegexExtractor {
    fn extract_calls(&self, body: &str) -> Vec<CallSite> {
        let Some(re) = CALL_RE.as_ref() else {
            return Vec::new();
        };

        let code = blank_comments_and_strings(body);
        let mut calls = Vec::new();

        for cap in re.captures_iter(&code) {
            let Some(name) = cap.get(1) else {
                continue;
            };
            let call_name = name.as_str();

            if is_excluded(call_name) || follows_definition_keyword(&code[..name.start()]) {
                continue;
            }

            calls.push(CallSite {
                name: call_name.to_string(),
                line: count_lines_before(&code, name.start()),
            });
        }

        calls
    }

    fn extract_tables(&self, query_text: &str) -> Vec<String> {
        let Some(re) = TABLE_RE.as_ref() else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut tables = Vec::new();
        for cap in re.captures_iter(query_text) {
            if let Some(name) = cap.get(1) {
                let table = name.as_str().to_string();
                if seen.insert(table.to_lowercase()) {
                    tables.push(table);
                }
            }
        }
        tables
    }
}

// --- Helper functions ---

fn is_excluded(name: &str) -> bool {
    let lower = name.to_lowercase();
    CALL_KEYWORDS.contains(&lower.as_str())
        || BUILTIN_PREFIXES
            .iter()
            .any(|prefix| lower.starts_with(prefix))
}

/// Whether the text right before a match ends with `Procedure`/`Function`.
fn follows_definition_keyword(before: &str) -> bool {
    let trimmed = before.trim_end();
    let word_start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    let previous = trimmed[word_start..].to_lowercase();
    DEFINITION_KEYWORDS.contains(&previous.as_str())
}

/// Replace `//` comments and `"..."` literals with spaces, keeping newlines
/// so line numbers still line up. Doubled quotes inside a literal toggle out
/// and straight back in, which keeps them blanked.
fn blank_comments_and_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut in_comment = false;

    while let Some(c) = chars.next() {
        if c == '\n' {
            in_comment = false;
            out.push('\n');
            continue;
        }

        if in_comment {
            out.push(' ');
        } else if in_string {
            if c == '"' {
                in_string = false;
            }
            out.push(' ');
        } else if c == '"' {
            in_string = true;
            out.push(' ');
        } else if c == '/' && chars.peek() == Some(&'/') {
            in_comment = true;
            out.push(' ');
        } else {
            out.push(c);
        }
    }

    out
}

/// 1-based line of a byte offset.
fn count_lines_before(content: &str, offset: usize) -> u32 {
    content[..offset].matches('\n').count() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_names(body: &str) -> Vec<String> {
        RegexExtractor::new()
            .extract_calls(body)
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    #[test]
    fn test_extract_calls() {
        let body = r#"
Procedure Post(Document) Export
    Total = CalculateTotal(Document);
    If Validate(Total) Then
        WriteLog(Total);
    EndIf;
    Return;
EndProcedure
"#;
        let calls = call_names(body);
        assert_eq!(calls, vec!["CalculateTotal", "Validate", "WriteLog"]);
    }

    #[test]
    fn test_russian_keywords_and_builtins_are_skipped() {
        let body = r#"
Функция ЦенаТовара(Товар) Экспорт
    Если НЕ ЗначениеЗаполнено(Товар) Тогда
        Возврат 0;
    КонецЕсли;
    Имя = СтрДлина(Товар.Имя);
    Возврат ПолучитьЦену(Товар);
КонецФункции
"#;
        assert_eq!(call_names(body), vec!["ПолучитьЦену"]);
    }

    #[test]
    fn test_comments_and_strings_are_ignored() {
        let body = "Run(); // Skipped(\nText = \"Quoted(\"\"x\"\")\";\nDone();";
        let calls = RegexExtractor::new().extract_calls(body);
        assert_eq!(
            calls,
            vec![
                CallSite {
                    name: "Run".to_string(),
                    line: 1
                },
                CallSite {
                    name: "Done".to_string(),
                    line: 3
                },
            ]
        );
    }

    #[test]
    fn test_extract_tables() {
        let extractor = RegexExtractor::new();
        let tables = extractor.extract_tables(
            "SELECT g.Name FROM Catalog.Goods AS g LEFT JOIN InformationRegister.Prices AS p \
             ON p.Good = g.Ref JOIN Catalog.Goods AS g2 ON TRUE",
        );
        assert_eq!(tables, vec!["Catalog.Goods", "InformationRegister.Prices"]);

        let tables = extractor.extract_tables(
            "ВЫБРАТЬ Т.Ссылка ПОМЕСТИТЬ ВТ_Товары ИЗ Справочник.Товары КАК Т",
        );
        assert_eq!(tables, vec!["ВТ_Товары", "Справочник.Товары"]);

        let tables = extractor.extract_tables("update orders set paid = 1");
        assert_eq!(tables, vec!["orders"]);
    }

    #[test]
    fn test_no_tables_in_subquery_head() {
        let tables = RegexExtractor::new().extract_tables("SELECT * FROM (SELECT 1)");
        assert!(tables.is_empty());
    }
}
