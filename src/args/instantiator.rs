//! Turns argument groups into configured, independent plugin instances.

use crate::args::splitter::ArgGroups;
use crate::error::ConfigurationError;
use crate::plugin::Plugin;
use crate::registry::{InstantiationError, PluginMap};

/// Configured plugins in command-line order, skipped ones removed.
#[derive(Debug)]
pub struct Instantiated<P> {
    pub plugins: Vec<P>,
    /// Tokens a plugin did not consume, per plugin name. Only non-empty
    /// when unknown arguments are allowed.
    pub unconsumed: Vec<(String, Vec<String>)>,
}

/// Creates a fresh instance for every plugin group and configures it from
/// the rest of the group.
///
/// Instances never share state with the registry prototype or with each
/// other, so the same plugin may appear several times in one chain.
pub fn instantiate<P: Plugin>(
    groups: &ArgGroups,
    plugins: &PluginMap<P>,
    allow_global_options: bool,
    allow_unknown_args: bool,
) -> Result<Instantiated<P>, ConfigurationError> {
    if !groups.global().is_empty() && !allow_global_options {
        return Err(ConfigurationError::GlobalOptionsNotAllowed(
            groups.global().to_vec(),
        ));
    }

    let mut result = Instantiated {
        plugins: Vec::new(),
        unconsumed: Vec::new(),
    };

    for group in groups.plugins() {
        let Some((name, args)) = group.split_first() else {
            continue;
        };
        let entry = plugins
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownPlugin(name.clone()))?;

        let mut plugin = entry.instantiate().map_err(|e| match e {
            InstantiationError::NotImplemented => ConfigurationError::UnknownPlugin(name.clone()),
            InstantiationError::Failed(reason) => {
                ConfigurationError::Invalid(format!("Failed to create '{}': {}", name, reason))
            }
        })?;

        let unconsumed = plugin.configure(args)?;
        if !unconsumed.is_empty() {
            if !allow_unknown_args {
                return Err(ConfigurationError::UnknownArguments {
                    plugin: name.clone(),
                    args: unconsumed,
                });
            }
            tracing::warn!(plugin = %name, args = ?unconsumed, "Ignoring unknown arguments");
            result.unconsumed.push((name.clone(), unconsumed));
        }

        if plugin.is_skipped() {
            tracing::debug!(plugin = %name, "Skipping plugin");
            continue;
        }
        result.plugins.push(plugin);
    }

    Ok(result)
}
