//! Code graph builder: parsed modules in, nodes and edges out.

use ignore::WalkBuilder;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::extractor::{ReferenceExtractor, RegexExtractor};
use super::patterns::DEFAULT_EXCLUDE_DIRS;
use super::report::{DirectoryReport, FileReport, ModuleReport};
use crate::graph::{Edge, EdgeKind, GraphBackend, GraphError, Node, NodeKind, Props};
use crate::parser::{ParsedCallable, ParsedModule, ParserRegistry};

/// Caller-supplied facts attached to every module node.
#[derive(Debug, Clone, Default)]
pub struct ModuleMetadata {
    /// Configuration (system) the module belongs to. The analyzer scopes by it.
    pub configuration: Option<String>,
    pub owner: Option<String>,
    /// Overrides the line count derived from callable spans.
    pub line_count: Option<usize>,
    pub props: Props,
}

impl ModuleMetadata {
    pub fn for_configuration(name: impl Into<String>) -> Self {
        Self {
            configuration: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_prop(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

/// Builds the code part of the graph.
///
/// One builder is one ingestion run. It remembers the external-call
/// placeholders it created, and which modules export what, so that
/// placeholders are shared across files and [`link_modules`](Self::link_modules)
/// can turn unresolved calls into module dependencies.
pub struct CodeGraphBuilder {
    backend: Arc<dyn GraphBackend>,
    extractor: Box<dyn ReferenceExtractor>,
    registry: ParserRegistry,
    exclude_dirs: Vec<String>,
    /// Lowercased callee name -> placeholder node id.
    placeholders: HashMap<String, String>,
    /// Lowercased table name -> table node id, first spelling wins.
    tables: HashMap<String, String>,
    /// Lowercased callee name -> modules calling it unresolved.
    unresolved_callers: BTreeMap<String, BTreeSet<String>>,
    /// Lowercased callable name -> (module id, name as declared) of exports.
    exported: BTreeMap<String, BTreeSet<(String, String)>>,
}

impl CodeGraphBuilder {
    pub fn new(backend: Arc<dyn GraphBackend>) -> Self {
        Self {
            backend,
            extractor: Box::new(RegexExtractor::new()),
            registry: ParserRegistry::new(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            placeholders: HashMap::new(),
            tables: HashMap::new(),
            unresolved_callers: BTreeMap::new(),
            exported: BTreeMap::new(),
        }
    }

    /// Replace the call/table extraction strategy.
    pub fn with_extractor(mut self, extractor: Box<dyn ReferenceExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_registry(mut self, registry: ParserRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_exclude_dirs(mut self, exclude_dirs: Vec<String>) -> Self {
        self.exclude_dirs = exclude_dirs;
        self
    }

    /// Number of external-call placeholders created by this run.
    pub fn placeholder_count(&self) -> usize {
        self.placeholders.len()
    }

    /// Write one parsed module into the graph.
    pub async fn build_module(
        &mut self,
        path: &str,
        module: &ParsedModule,
        meta: &ModuleMetadata,
    ) -> Result<ModuleReport, GraphError> {
        let module_node = module_node(path, module, meta);
        let module_id = module_node.id.clone();
        let mut report = ModuleReport {
            module_id: module_id.clone(),
            ..ModuleReport::default()
        };

        self.backend.upsert_node(module_node).await?;
        report.nodes_created += 1;

        if module.is_empty() {
            debug!(module = %module_id, "module declares nothing");
            return Ok(report);
        }

        let callables: Vec<(NodeKind, &ParsedCallable)> = module
            .functions
            .iter()
            .map(|c| (NodeKind::Function, c))
            .chain(module.procedures.iter().map(|c| (NodeKind::Procedure, c)))
            .collect();

        // Callables and ownership
        let mut local: HashMap<String, String> = HashMap::new();
        for (kind, callable) in &callables {
            let node = callable_node(*kind, path, &module_id, callable);
            let key = callable.name.to_lowercase();
            local.insert(key.clone(), node.id.clone());

            if callable.is_export {
                self.exported
                    .entry(key)
                    .or_default()
                    .insert((module_id.clone(), callable.name.clone()));
            }

            let owns = Edge::new(module_id.clone(), node.id.clone(), EdgeKind::Owns);
            self.backend.upsert_node(node).await?;
            self.backend.upsert_edge(owns).await?;
            report.nodes_created += 1;
            report.edges_created += 1;
        }
        report.callables = callables.len();

        // Calls
        for (kind, callable) in &callables {
            let caller_id = callable_id(*kind, path, &callable.name);
            let mut seen = HashSet::new();

            for site in self.extractor.extract_calls(&callable.body) {
                let key = site.name.to_lowercase();
                if !seen.insert(key.clone()) {
                    continue;
                }
                let line = absolute_line(callable.start_line, site.line);

                let edge = match local.get(&key) {
                    Some(target) => {
                        report.resolved_calls += 1;
                        Edge::new(caller_id.clone(), target.clone(), EdgeKind::Calls)
                            .with_prop("line", line)
                    }
                    None => {
                        let (target, created) = self.placeholder(&site.name, &key).await?;
                        if created {
                            report.nodes_created += 1;
                        }
                        self.unresolved_callers
                            .entry(key)
                            .or_default()
                            .insert(module_id.clone());
                        report.external_calls += 1;
                        Edge::new(caller_id.clone(), target, EdgeKind::Calls)
                            .with_prop("line", line)
                            .with_prop("external", true)
                            .with_prop("resolved", false)
                    }
                };

                self.backend.upsert_edge(edge).await?;
                report.edges_created += 1;
            }
        }

        // Queries and tables
        let mut seen_queries = HashSet::new();
        let mut seen_tables = HashSet::new();
        for query in &module.queries {
            let hash = query_hash(&query.text);
            if !seen_queries.insert(hash.clone()) {
                continue;
            }

            let kind = query.kind();
            let tables = self.extractor.extract_tables(&query.text);
            let statement = if query.query_type.trim().is_empty() {
                kind.operation().to_uppercase()
            } else {
                query.query_type.trim().to_uppercase()
            };

            let node = Node::new(
                NodeKind::Query,
                &format!("{path}:{hash}"),
                format!("{statement} (line {})", query.line),
            )
            .with_label("data")
            .with_prop("text", query.text.clone())
            .with_prop("query_type", statement)
            .with_prop("operation", kind.operation())
            .with_prop("line", query.line)
            .with_prop("module", module_id.clone())
            .with_prop("tables", tables.clone());
            let query_id = node.id.clone();

            self.backend.upsert_node(node).await?;
            self.backend
                .upsert_edge(
                    Edge::new(module_id.clone(), query_id.clone(), EdgeKind::ExecutesQuery)
                        .with_prop("line", query.line),
                )
                .await?;
            report.queries += 1;
            report.nodes_created += 1;
            report.edges_created += 1;

            let access = match kind {
                crate::parser::QueryKind::Read => EdgeKind::ReadsTable,
                crate::parser::QueryKind::Write => EdgeKind::WritesTable,
            };

            for table in tables {
                let (table_id, created) = self.table(&table).await?;
                if created {
                    report.nodes_created += 1;
                }
                seen_tables.insert(table_id.clone());
                self.backend
                    .upsert_edge(
                        Edge::new(query_id.clone(), table_id, access)
                            .with_prop("operation", kind.operation()),
                    )
                    .await?;
                report.edges_created += 1;
            }
        }
        report.tables = seen_tables.len();

        debug!(
            module = %module_id,
            callables = report.callables,
            queries = report.queries,
            external_calls = report.external_calls,
            "built module"
        );
        Ok(report)
    }

    /// Parse and build one source file.
    ///
    /// A file no parser accepts degrades to a module node carrying the
    /// `parse_error` prop. Only backend failures are returned as errors.
    pub async fn ingest_source(
        &mut self,
        path: &str,
        content: &str,
        meta: &ModuleMetadata,
    ) -> Result<FileReport, GraphError> {
        let parsed = match self.registry.parser_for_path(Path::new(path)) {
            Some(parser) => parser.parse_module(path, content),
            None => Err(format!("no parser registered for '{path}'")),
        };
        let parsed = parsed.and_then(|module| module.validate().map(|_| module));

        match parsed {
            Ok(module) => {
                let report = self.build_module(path, &module, meta).await?;
                Ok(FileReport::ingested(path, &report))
            }
            Err(error) => {
                warn!(path, %error, "parse failed, keeping module node only");
                let node = degraded_module_node(path, meta, &error);
                let module_id = node.id.clone();
                self.backend.upsert_node(node).await?;
                Ok(FileReport::degraded(path, module_id, error))
            }
        }
    }

    /// Ingest every parseable file under `root`, in path order.
    ///
    /// One bad file never stops the batch: unreadable files and files whose
    /// writes the store rejects are reported as failed, unparsable ones as
    /// degraded. Only an unavailable or timed-out store aborts the run. The
    /// cross-module link pass runs once at the end.
    pub async fn ingest_directory(
        &mut self,
        root: &Path,
        meta: &ModuleMetadata,
    ) -> Result<DirectoryReport, GraphError> {
        let mut reports = Vec::new();

        for file in self.collect_files(root) {
            let relative = file
                .strip_prefix(root)
                .unwrap_or(&file)
                .to_string_lossy()
                .replace('\\', "/");

            let report = match fs::read_to_string(&file) {
                Ok(content) => match self.ingest_source(&relative, &content, meta).await {
                    Ok(report) => report,
                    Err(e) if e.is_unavailable() => return Err(e),
                    Err(e) => {
                        warn!(path = %relative, error = %e, "failed to store file");
                        FileReport::failed(relative.as_str(), e.to_string())
                    }
                },
                Err(e) => {
                    warn!(path = %relative, error = %e, "failed to read file");
                    FileReport::failed(relative.as_str(), e.to_string())
                }
            };
            reports.push(report);
        }

        let linked = match self.link_modules().await {
            Ok(linked) => linked,
            Err(e) if e.is_unavailable() => return Err(e),
            Err(e) => {
                warn!(error = %e, "failed to link modules");
                0
            }
        };
        let report = DirectoryReport::from_files(root.display().to_string(), reports, linked);

        info!(
            root = %report.root,
            processed = report.files_processed,
            degraded = report.files_degraded,
            failed = report.files_failed,
            nodes = report.nodes_created,
            edges = report.edges_created,
            "directory ingested"
        );
        Ok(report)
    }

    /// Add `depends_on` module edges for unresolved calls that name an
    /// exported callable of another module seen in this run.
    ///
    /// Returns the number of module pairs linked.
    pub async fn link_modules(&self) -> Result<usize, GraphError> {
        let mut links: BTreeMap<(String, String), BTreeSet<String>> = BTreeMap::new();

        for (key, callers) in &self.unresolved_callers {
            let Some(exporters) = self.exported.get(key) else {
                continue;
            };
            for caller in callers {
                for (callee, name) in exporters {
                    if callee != caller {
                        links
                            .entry((caller.clone(), callee.clone()))
                            .or_default()
                            .insert(name.clone());
                    }
                }
            }
        }

        for ((source, target), names) in &links {
            let via: Vec<String> = names.iter().cloned().collect();
            self.backend
                .upsert_edge(
                    Edge::new(source.clone(), target.clone(), EdgeKind::DependsOn)
                        .with_prop("via", via),
                )
                .await?;
        }

        if !links.is_empty() {
            debug!(links = links.len(), "linked modules through exported callables");
        }
        Ok(links.len())
    }

    /// Shared placeholder for an unresolved callee. Returns its id and whether
    /// it was created by this call.
    async fn placeholder(&mut self, name: &str, key: &str) -> Result<(String, bool), GraphError> {
        if let Some(id) = self.placeholders.get(key) {
            return Ok((id.clone(), false));
        }

        let node = Node::new(NodeKind::ExternalCall, name, name)
            .with_label("unresolved")
            .with_prop("name", name);
        let id = node.id.clone();
        self.backend.upsert_node(node).await?;
        debug!(callee = name, "created external call placeholder");

        self.placeholders.insert(key.to_string(), id.clone());
        Ok((id, true))
    }

    /// Shared table node, matched case-insensitively. Returns its id and
    /// whether it was created by this call.
    async fn table(&mut self, name: &str) -> Result<(String, bool), GraphError> {
        let key = name.to_lowercase();
        if let Some(id) = self.tables.get(&key) {
            return Ok((id.clone(), false));
        }

        let node = Node::new(NodeKind::DatabaseTable, name, name)
            .with_label("data")
            .with_prop("name", name);
        let id = node.id.clone();
        self.backend.upsert_node(node).await?;

        self.tables.insert(key, id.clone());
        Ok((id, true))
    }

    fn collect_files(&self, root: &Path) -> Vec<PathBuf> {
        let exclude = self.exclude_dirs.clone();
        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map_or(false, |t| t.is_dir());
                let excluded = entry
                    .file_name()
                    .to_str()
                    .map_or(false, |name| exclude.iter().any(|e| e == name));
                !(is_dir && excluded)
            })
            .build();

        let mut files: Vec<PathBuf> = walker
            .flatten()
            .filter(|entry| entry.file_type().map_or(false, |t| t.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| self.registry.parser_for_path(path).is_some())
            .collect();
        files.sort();
        files
    }
}

/// Id of a function or procedure node.
pub fn callable_id(kind: NodeKind, module_path: &str, name: &str) -> String {
    kind.node_id(&format!("{module_path}:{name}"))
}

/// First 16 hex chars of SHA-256 over the query text with whitespace
/// collapsed and upper-cased.
pub fn query_hash(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(16);
    digest
}

fn absolute_line(start_line: u32, offset: u32) -> u32 {
    if start_line == 0 {
        offset
    } else {
        start_line + offset - 1
    }
}

/// Last line any item of the module is known to occupy.
fn module_extent(module: &ParsedModule) -> u32 {
    let callables = module
        .functions
        .iter()
        .chain(&module.procedures)
        .map(|c| c.end_line);
    let variables = module.variables.iter().map(|v| v.line);
    let queries = module.queries.iter().map(|q| q.line);
    callables.chain(variables).chain(queries).max().unwrap_or(0)
}

fn base_module_node(path: &str, meta: &ModuleMetadata) -> Node {
    let mut node = Node::new(NodeKind::Module, path, path).with_label("code");
    node.props.extend(meta.props.clone());
    node.props.insert("path".to_string(), path.into());
    if let Some(configuration) = &meta.configuration {
        node.props
            .insert("configuration".to_string(), configuration.clone().into());
    }
    if let Some(owner) = &meta.owner {
        node.props.insert("owner".to_string(), owner.clone().into());
    }
    node
}

fn module_node(path: &str, module: &ParsedModule, meta: &ModuleMetadata) -> Node {
    let lines = meta
        .line_count
        .unwrap_or_else(|| module_extent(module) as usize);

    base_module_node(path, meta)
        .with_prop("lines", lines)
        .with_prop("functions", module.functions.len())
        .with_prop("procedures", module.procedures.len())
        .with_prop("callables", module.callable_count())
        .with_prop("variables", module.variables.len())
        .with_prop("queries", module.queries.len())
}

fn degraded_module_node(path: &str, meta: &ModuleMetadata, error: &str) -> Node {
    let mut node = base_module_node(path, meta)
        .with_label("degraded")
        .with_prop("parse_error", error);
    if let Some(lines) = meta.line_count {
        node.props.insert("lines".to_string(), lines.into());
    }
    node
}

fn callable_node(kind: NodeKind, path: &str, module_id: &str, callable: &ParsedCallable) -> Node {
    Node::new(kind, &format!("{path}:{}", callable.name), callable.name.clone())
        .with_label("code")
        .with_prop("module", module_id)
        .with_prop("is_export", callable.is_export)
        .with_prop("parameters", callable.parameters.clone())
        .with_prop("complexity", callable.complexity)
        .with_prop("start_line", callable.start_line)
        .with_prop("end_line", callable.end_line)
        .with_prop("has_documentation", callable.has_documentation)
}
