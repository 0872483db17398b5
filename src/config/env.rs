//! Comma-separated list settings with environment overrides.
//!
//! Precedence is: explicitly set custom value, then the environment
//! variable, then the defaults. Within an override, the `DEFAULT`
//! placeholder expands to the default list in place.

use std::sync::Arc;

/// Placeholder inside a list override that stands for the default entries.
pub const DEFAULT_PLACEHOLDER: &str = "DEFAULT";

pub const ENV_MODULES: &str = "STAGEHAND_MODULES";
pub const ENV_EXCLUDED_MODULES: &str = "STAGEHAND_EXCLUDED_MODULES";
pub const ENV_CLASS_LISTERS: &str = "STAGEHAND_CLASS_LISTERS";
pub const ENV_EXCLUDED_CLASS_LISTERS: &str = "STAGEHAND_EXCLUDED_CLASS_LISTERS";

/// Environment lookup, injectable so discovery can be tested without
/// touching the process environment.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String>>;

/// Lookup backed by the process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|key: &str| std::env::var(key).ok())
}

/// Splits a comma-separated list, trimming entries and dropping blanks.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `value` and replaces every `DEFAULT` entry with `defaults`.
pub fn expand_default(value: &str, defaults: &[String]) -> Vec<String> {
    let mut result = Vec::new();
    for entry in parse_list(value) {
        if entry == DEFAULT_PLACEHOLDER {
            result.extend(defaults.iter().cloned());
        } else {
            result.push(entry);
        }
    }
    result
}

/// A list setting resolved from custom value, environment and defaults.
#[derive(Debug, Clone, Default)]
pub struct ListSetting {
    custom: Option<Vec<String>>,
    env_var: Option<String>,
    defaults: Vec<String>,
}

impl ListSetting {
    pub fn new<I, S>(defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            custom: None,
            env_var: None,
            defaults: defaults.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = Some(name.into());
        self
    }

    pub fn set_custom(&mut self, custom: Option<Vec<String>>) {
        self.custom = custom.filter(|c| !c.is_empty());
    }

    pub fn set_defaults(&mut self, defaults: Vec<String>) {
        self.defaults = defaults;
    }

    pub fn custom(&self) -> Option<&[String]> {
        self.custom.as_deref()
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    /// The environment override, if the variable is set to a non-blank value.
    pub fn env_value(&self, env: &dyn Fn(&str) -> Option<String>) -> Option<String> {
        let name = self.env_var.as_deref()?;
        env(name).filter(|v| !v.trim().is_empty())
    }

    /// Whether a custom value or an environment override is in effect.
    pub fn is_overridden(&self, env: &dyn Fn(&str) -> Option<String>) -> bool {
        self.custom.is_some() || self.env_value(env).is_some()
    }

    pub fn resolve(&self, env: &dyn Fn(&str) -> Option<String>) -> Vec<String> {
        if let Some(custom) = &self.custom {
            return expand_default(&custom.join(","), &self.defaults);
        }
        if let Some(value) = self.env_value(env) {
            return expand_default(&value, &self.defaults);
        }
        self.defaults.clone()
    }
}
