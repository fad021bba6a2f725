//! Default values for archgraph configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Graph Store Defaults
// ============================================================================

/// Default persistent store endpoint (embedded RocksDB).
pub const DEFAULT_ENDPOINT: &str = "rocksdb://.archgraph/graph";

/// Default store namespace.
pub const DEFAULT_NAMESPACE: &str = "archgraph";

/// Default store database.
pub const DEFAULT_DATABASE: &str = "graph";

/// Time budget for a single store call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Project-local config file name.
pub const CONFIG_FILE_NAME: &str = "archgraph.toml";

// ============================================================================
// Indexer Defaults
// ============================================================================

/// Default file extensions to ingest.
pub const DEFAULT_EXTENSIONS: &[&str] = crate::indexer::DEFAULT_EXTENSIONS;

/// Default directories to skip.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = crate::indexer::DEFAULT_EXCLUDE_DIRS;

// ============================================================================
// Analysis Defaults
// ============================================================================

/// Mean outgoing dependency count at which coupling saturates.
pub const DEFAULT_COUPLING_CEILING: f64 = 10.0;

/// Longest dependency cycle searched for.
pub const DEFAULT_MAX_CYCLE_LENGTH: usize = 5;

/// Callable count above which a module is a god object.
pub const DEFAULT_GOD_CALLABLES: usize = 50;

/// Outgoing dependency count above which a module is a god object.
pub const DEFAULT_GOD_OUTGOING: usize = 15;

/// Incoming dependency count above which a module is a god object.
pub const DEFAULT_GOD_INCOMING: usize = 20;

/// Coupling above this produces a recommendation.
pub const DEFAULT_HIGH_COUPLING: f64 = 0.5;

/// Cohesion below this produces a recommendation.
pub const DEFAULT_LOW_COHESION: f64 = 0.5;
