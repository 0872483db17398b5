//! Error types shared by discovery, assembly and execution.

use thiserror::Error;

use crate::config::ConfigError;

/// Invalid command line or plugin configuration.
///
/// Always fatal to the operation that raised it.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("No global options allowed (found: {})", .0.join(" "))]
    GlobalOptionsNotAllowed(Vec<String>),

    #[error("Unknown argument(s) for plugin '{plugin}': {}", .args.join(" "))]
    UnknownArguments { plugin: String, args: Vec<String> },

    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error(
        "Duplicate plugin name encountered: name={name}, existing type={existing}, new type={new}"
    )]
    DuplicateName {
        name: String,
        existing: String,
        new: String,
    },

    #[error("{option}: missing required value")]
    MissingValue { option: String },

    #[error("Invalid value '{value}' for {option}: {reason}")]
    InvalidValue {
        option: String,
        value: String,
        reason: String,
    },

    #[error("Invalid split configuration: {0}")]
    InvalidSplit(String),

    #[error("{0}")]
    Invalid(String),
}

impl ConfigurationError {
    pub fn invalid_value(
        option: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidValue {
            option: option.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failure to locate or load a plugin class, module or class lister.
///
/// Discovery errors for a single module or entry point are logged and
/// skipped; they only surface to callers through `fail_if_empty` lookups.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Class '{class}' not found in module '{module}'")]
    UnknownClass { module: String, class: String },

    #[error("Class lister function '{function}' not found in module '{module}'")]
    UnknownLister { module: String, function: String },

    #[error("Malformed entry point '{0}', expected name=module:attribute")]
    MalformedEntryPoint(String),

    #[error("Failed to resolve superclass: {0}")]
    UnknownSuperclass(String),

    #[error("No classes found for: {0}")]
    NoClassesFound(String),
}

/// Adjacent plugins in a chain that cannot exchange data.
#[derive(Debug, Error)]
pub enum CompatibilityError {
    #[error("Plugin #{index} ({name}) does not generate any output")]
    NotAProducer { index: usize, name: String },

    #[error("Plugin #{index} ({name}) does not accept any input")]
    NotAConsumer { index: usize, name: String },

    #[error(
        "Plugin #{producer_index} ({producer}) generates [{generates}] but plugin #{consumer_index} ({consumer}) accepts [{accepts}]"
    )]
    Incompatible {
        producer_index: usize,
        producer: String,
        generates: String,
        consumer_index: usize,
        consumer: String,
        accepts: String,
    },
}

/// Failure while initializing, running or finalizing a pipeline stage.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{stage}: {message}")]
    Stage { stage: String, message: String },

    #[error("Failed to initialize {role} '{name}': {source}")]
    Initialization {
        role: &'static str,
        name: String,
        #[source]
        source: Box<ProcessingError>,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl ProcessingError {
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// Umbrella error for front ends that drive the whole flow.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Compatibility(#[from] CompatibilityError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
