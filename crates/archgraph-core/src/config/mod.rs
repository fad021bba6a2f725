//! Configuration management for archgraph.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `archgraph.toml` file
//! 3. User config `~/.config/archgraph/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Graph store configuration.
    pub graph: GraphConfig,

    /// Source ingestion configuration.
    pub indexer: IndexerConfig,

    /// Analyzer thresholds.
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./archgraph.toml` (project local)
    /// 2. `~/.config/archgraph/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        // Try project-local config first
        if Path::new(CONFIG_FILE_NAME).exists() {
            return Self::from_file(CONFIG_FILE_NAME);
        }

        // Try user config
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("archgraph").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides. Unparsable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(backend) = std::env::var("ARCHGRAPH_BACKEND") {
            if let Ok(kind) = backend.parse() {
                self.graph.backend = kind;
            }
        }
        if let Ok(endpoint) = std::env::var("ARCHGRAPH_ENDPOINT") {
            self.graph.endpoint = endpoint;
        }
        if let Ok(namespace) = std::env::var("ARCHGRAPH_NAMESPACE") {
            self.graph.namespace = namespace;
        }
        if let Ok(database) = std::env::var("ARCHGRAPH_DATABASE") {
            self.graph.database = database;
        }
        if let Ok(username) = std::env::var("ARCHGRAPH_USERNAME") {
            self.graph.username = Some(username);
        }
        if let Ok(password) = std::env::var("ARCHGRAPH_PASSWORD") {
            self.graph.password = Some(password);
        }
        if let Ok(timeout) = std::env::var("ARCHGRAPH_TIMEOUT_SECS") {
            if let Ok(n) = timeout.parse() {
                self.graph.timeout_secs = n;
            }
        }
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graph.timeout_secs == 0 {
            return Err(ConfigError::Invalid("graph.timeout_secs must be positive".into()));
        }
        if self.graph.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("graph.endpoint must not be empty".into()));
        }
        let ceiling = self.analysis.coupling_ceiling;
        if !(ceiling.is_finite() && ceiling > 0.0) {
            return Err(ConfigError::Invalid(
                "analysis.coupling_ceiling must be a positive number".into(),
            ));
        }
        if self.analysis.max_cycle_length < 2 {
            return Err(ConfigError::Invalid(
                "analysis.max_cycle_length must be at least 2".into(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Which graph backend to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local graph, gone on exit.
    Memory,
    /// SurrealDB store at `graph.endpoint`.
    #[default]
    Surreal,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "surreal" | "surrealdb" => Ok(Self::Surreal),
            other => Err(ConfigError::Invalid(format!("unknown backend '{other}'"))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Surreal => write!(f, "surreal"),
        }
    }
}

/// Graph store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub backend: BackendKind,

    /// `mem://`, `rocksdb://<path>` or `ws://<host>`.
    pub endpoint: String,

    pub namespace: String,

    pub database: String,

    /// Root credentials, used only when both are set.
    pub username: Option<String>,

    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Time budget for each store call.
    pub timeout_secs: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            username: None,
            password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GraphConfig {
    /// In-memory graph, no store.
    pub fn memory() -> Self {
        Self {
            backend: BackendKind::Memory,
            ..Self::default()
        }
    }
}

/// Source ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// File extensions to ingest (without leading dot).
    pub extensions: Vec<String>,

    /// Directories to skip while walking.
    pub exclude_dirs: Vec<String>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Analyzer thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub coupling_ceiling: f64,
    pub max_cycle_length: usize,
    pub god_callables: usize,
    pub god_outgoing: usize,
    pub god_incoming: usize,
    pub high_coupling: f64,
    pub low_cohesion: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            coupling_ceiling: DEFAULT_COUPLING_CEILING,
            max_cycle_length: DEFAULT_MAX_CYCLE_LENGTH,
            god_callables: DEFAULT_GOD_CALLABLES,
            god_outgoing: DEFAULT_GOD_OUTGOING,
            god_incoming: DEFAULT_GOD_INCOMING,
            high_coupling: DEFAULT_HIGH_COUPLING,
            low_cohesion: DEFAULT_LOW_COHESION,
        }
    }
}
