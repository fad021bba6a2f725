use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use archgraph_core::analysis::ArchitectureReport;
use archgraph_core::config::CONFIG_FILE_NAME;
use archgraph_core::graph::GraphDocument;
use archgraph_core::indexer::ModuleMetadata;
use archgraph_core::{ArchGraph, Config};

#[derive(Parser)]
#[command(name = "archgraph")]
#[command(about = "Architecture graph of a source-code system", long_about = None)]
struct Cli {
    /// Config file to use instead of the default search path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default archgraph.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Ingest parsed source modules under a directory
    Index {
        dir: PathBuf,
        /// Configuration the modules belong to
        #[arg(long)]
        configuration: Option<String>,
        /// Owner recorded on every module
        #[arg(long)]
        owner: Option<String>,
    },
    /// Ingest configuration metadata documents under a directory
    Metadata { dir: PathBuf },
    /// Run the architecture analysis
    Analyze {
        /// Only modules of this configuration
        #[arg(long)]
        configuration: Option<String>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Dump the whole graph
    Export {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load a previously exported graph
    Import { file: PathBuf },
    /// Show node and edge counts
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "archgraph_core=info,archgraph=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Commands::Init { force } = &cli.command {
        return init(*force);
    }

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    tracing::debug!(
        backend = %config.graph.backend,
        endpoint = %config.graph.endpoint,
        "configuration loaded"
    );
    let graph = ArchGraph::open(config)
        .await
        .context("Failed to open the graph store")?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Index {
            dir,
            configuration,
            owner,
        } => index(&graph, &dir, configuration, owner).await,
        Commands::Metadata { dir } => metadata(&graph, &dir).await,
        Commands::Analyze {
            configuration,
            json,
        } => analyze(&graph, configuration, json).await,
        Commands::Export { format, output } => export(&graph, format, output).await,
        Commands::Import { file } => import(&graph, &file).await,
        Commands::Stats => {
            let stats = graph.stats().await?;
            println!("Backend: {}", graph.backend().backend_name());
            println!("  Nodes: {}", stats.nodes);
            println!("  Edges: {}", stats.edges);
            Ok(())
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn init(force: bool) -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);
    if path.exists() && !force {
        bail!("{CONFIG_FILE_NAME} already exists, pass --force to overwrite");
    }
    std::fs::write(path, Config::default_config_string())
        .with_context(|| format!("Failed to write {CONFIG_FILE_NAME}"))?;
    println!("Wrote {CONFIG_FILE_NAME}");
    Ok(())
}

async fn index(
    graph: &ArchGraph,
    dir: &Path,
    configuration: Option<String>,
    owner: Option<String>,
) -> Result<()> {
    let meta = ModuleMetadata {
        configuration,
        owner,
        ..ModuleMetadata::default()
    };

    let bar = spinner(&format!("Indexing {}", dir.display()));
    let mut builder = graph.code_builder();
    let report = builder.ingest_directory(dir, &meta).await;
    bar.finish_and_clear();
    let report = report.context("Indexing failed")?;

    println!("Indexed {}", report.root);
    println!("  Files processed: {}/{}", report.files_processed, report.files_seen);
    println!("  Degraded: {}", report.files_degraded);
    println!("  Failed: {}", report.files_failed);
    println!("  Nodes written: {}", report.nodes_created);
    println!("  Edges written: {}", report.edges_created);
    println!("  Module dependencies linked: {}", report.dependencies_linked);

    for file in report.files.iter().filter(|f| f.error.is_some()) {
        if let Some(error) = &file.error {
            println!("  ! {}: {}", file.path, error);
        }
    }
    Ok(())
}

async fn metadata(graph: &ArchGraph, dir: &Path) -> Result<()> {
    let bar = spinner(&format!("Reading metadata from {}", dir.display()));
    let report = graph.metadata_ingestor().ingest_directory(dir).await;
    bar.finish_and_clear();
    let report = report.context("Metadata ingestion failed")?;

    println!("Documents: {}", report.documents_seen);
    println!("  Objects: {}", report.objects_ingested);
    println!("  Containment edges: {}", report.containment_edges);
    println!("  Unresolved references: {}", report.unresolved_references);
    for failure in &report.failures {
        println!("  ! {}: {}", failure.source, failure.error);
    }
    Ok(())
}

async fn analyze(graph: &ArchGraph, configuration: Option<String>, json: bool) -> Result<()> {
    let mut analyzer = graph.analyzer();
    if let Some(configuration) = configuration {
        analyzer = analyzer.scoped(configuration);
    }

    let bar = spinner("Analyzing architecture");
    let report = analyzer.analyze().await;
    bar.finish_and_clear();
    let report = report.context("Analysis failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ArchitectureReport) {
    match &report.configuration {
        Some(name) => println!("Architecture of {name}"),
        None => println!("Architecture"),
    }
    println!("  Score: {:.1}/10", report.score);
    println!("  Modules: {}", report.modules);
    println!("  Coupling: {:.2}", report.coupling);
    println!("  Cohesion: {:.2}", report.cohesion);
    println!("  Cycles: {}", report.cycles.len());
    for cycle in &report.cycles {
        println!("    [{}] {}", cycle.severity.as_str(), cycle.nodes.join(" -> "));
    }
    println!("  God objects: {}", report.god_objects.len());
    for god in &report.god_objects {
        println!(
            "    {} ({} callables, {} out, {} in)",
            god.display_name, god.callables, god.outgoing_dependencies, god.incoming_dependencies
        );
    }
    println!("  Orphans: {}", report.orphans.len());

    if !report.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for rec in &report.recommendations {
            println!("  - [{:?}] {}", rec.priority, rec.issue);
            println!("    {}", rec.action);
        }
    }
}

async fn export(graph: &ArchGraph, format: Format, output: Option<PathBuf>) -> Result<()> {
    let document = graph.export().await.context("Export failed")?;
    let content = match format {
        Format::Json => document.to_json()?,
        Format::Yaml => document.to_yaml()?,
    };

    match output {
        Some(path) => {
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let stats = document.stats();
            println!(
                "Exported {} nodes and {} edges to {}",
                stats.nodes,
                stats.edges,
                path.display()
            );
        }
        None => println!("{content}"),
    }
    Ok(())
}

async fn import(graph: &ArchGraph, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let is_yaml = file
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |ext| matches!(ext, "yaml" | "yml"));
    let document = if is_yaml {
        GraphDocument::from_yaml(&content)?
    } else {
        GraphDocument::from_json(&content)?
    };

    let stats = graph.import(&document).await.context("Import failed")?;
    println!("Imported {} nodes and {} edges", stats.nodes, stats.edges);
    Ok(())
}
