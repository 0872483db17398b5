//! Application configuration: the TOML file plus environment-variable
//! overrides for module and class-lister lists.

pub mod env;
pub mod loader;
pub mod types;

pub use env::{
    expand_default, parse_list, ListSetting, DEFAULT_PLACEHOLDER, ENV_CLASS_LISTERS,
    ENV_EXCLUDED_CLASS_LISTERS, ENV_EXCLUDED_MODULES, ENV_MODULES,
};
pub use loader::ConfigError;
pub use types::{CacheConfig, CliConfig, Config, DiscoveryConfig, ExecutionConfig};
