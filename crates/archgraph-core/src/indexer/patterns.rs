//! Regex patterns and keyword lists for reference extraction.

/// Default file extensions to ingest.
pub const DEFAULT_EXTENSIONS: &[&str] = &["json"];

/// Directories skipped while walking a source tree.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[".git", "target", "node_modules", ".archgraph"];

/// Pattern for extracting call sites: an identifier followed by `(`.
pub const CALL_PATTERN: &str = r"\b(\w+)\s*\(";

/// Pattern for table references in query text. Group 1 is the (possibly
/// dotted) table name.
pub const TABLE_PATTERN: &str =
    r"(?i)\b(?:FROM|JOIN|INTO|UPDATE|ИЗ|СОЕДИНЕНИЕ|ПОМЕСТИТЬ)\s+([^\W\d]\w*(?:\.\w+)*)";

/// Control-flow and reserved words that look like calls but aren't.
/// Compared case-insensitively.
pub const CALL_KEYWORDS: &[&str] = &[
    // English
    "if", "elsif", "else", "while", "for", "each", "in", "to", "do", "return", "new", "raise",
    "try", "except", "procedure", "function", "and", "or", "not", "then", "val", "export",
    "endif", "enddo", "endtry", "var", "await",
    // Russian
    "если", "иначеесли", "иначе", "пока", "для", "каждого", "из", "по", "цикл", "тогда",
    "возврат", "новый", "вызватьисключение", "попытка", "исключение", "процедура", "функция",
    "и", "или", "не", "знач", "экспорт", "конецесли", "конеццикла", "конецпопытки", "перем",
    "ждать",
];

/// Words that introduce a callable definition header.
pub const DEFINITION_KEYWORDS: &[&str] = &["procedure", "function", "процедура", "функция"];

/// Built-in routine name prefixes. Compared case-insensitively.
pub const BUILTIN_PREFIXES: &[&str] = &[
    "стр", "str", "нрег", "lower", "врег", "upper", "формат", "format", "сообщить", "message",
    "тип", "type", "текущаядата", "currentdate", "значениезаполнено", "valueisfilled",
];
