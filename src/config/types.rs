use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub cli: CliConfig,
}

/// Where plugins and class listers are looked up.
///
/// Empty lists mean "use the built-in defaults". Environment variables
/// override the list settings, and may reference the defaults through the
/// `DEFAULT` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Modules scanned when entry points yield nothing.
    #[serde(default)]
    pub modules: Vec<String>,
    /// Module-name prefixes whose classes are never registered.
    #[serde(default)]
    pub excluded_modules: Vec<String>,
    /// Class listers (`module:function`) used as fallback.
    #[serde(default)]
    pub class_listers: Vec<String>,
    /// Class listers whose results are subtracted.
    #[serde(default)]
    pub excluded_class_listers: Vec<String>,
    /// Reject two different classes claiming the same name (default: true).
    #[serde(default = "default_enforce_uniqueness")]
    pub enforce_uniqueness: bool,
}

/// Pipeline execution defaults, overridable per run from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Progress is logged every N records (default: 1000).
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,
    /// Run in batch mode even for stream writers.
    #[serde(default)]
    pub force_batch: bool,
}

/// Class-list cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
}

/// Command-line resolution settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Accept unambiguous prefixes of plugin names.
    #[serde(default)]
    pub partial_names: bool,
}

fn default_enforce_uniqueness() -> bool {
    true
}

fn default_update_interval() -> u64 {
    1000
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            excluded_modules: Vec::new(),
            class_listers: Vec::new(),
            excluded_class_listers: Vec::new(),
            enforce_uniqueness: default_enforce_uniqueness(),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            update_interval: default_update_interval(),
            force_batch: false,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
        }
    }
}
