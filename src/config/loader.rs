use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Why the config file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not TOML, or a value of the wrong type for its setting.
    #[error("Config file '{path}' is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl Config {
    /// `<config dir>/stagehand/config.toml`, where the config dir honours
    /// `XDG_CONFIG_HOME`; `./stagehand/config.toml` when there is none.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("stagehand").join("config.toml")
    }

    /// Discovery, execution and CLI settings from [`Config::config_path`].
    ///
    /// A missing file means built-in defaults; a present file must parse
    /// and pass [`Config::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from an explicit path, with the same rules as [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no run could use: a zero progress interval, blank
    /// module or lister entries, and listers not in `module[:function]` form.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.update_interval == 0 {
            return Err(ConfigError::Invalid {
                message: "execution.update_interval must be greater than zero".to_string(),
            });
        }

        let discovery = &self.discovery;
        for (field, values) in [
            ("discovery.modules", &discovery.modules),
            ("discovery.excluded_modules", &discovery.excluded_modules),
            ("discovery.class_listers", &discovery.class_listers),
            (
                "discovery.excluded_class_listers",
                &discovery.excluded_class_listers,
            ),
        ] {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(ConfigError::Invalid {
                    message: format!("{} contains an empty entry", field),
                });
            }
        }

        for lister in discovery
            .class_listers
            .iter()
            .chain(&discovery.excluded_class_listers)
        {
            if lister.matches(':').count() > 1 {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "Class lister '{}' must have the form module[:function]",
                        lister
                    ),
                });
            }
        }

        Ok(())
    }
}
