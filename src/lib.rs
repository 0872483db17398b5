//! Plugin discovery and command-line assembly of reader → filter → writer
//! pipelines.

pub mod args;
pub mod builtin;
pub mod compat;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod plugin;
pub mod registry;

pub use error::{
    CompatibilityError, ConfigurationError, DiscoveryError, PipelineError, ProcessingError,
};
