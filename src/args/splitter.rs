//! Splits a flat command line into a global group and per-plugin groups.

use crate::args::resolver::NameResolver;

pub const HELP_FLAGS: [&str; 2] = ["-h", "--help"];
pub const HELP_ALL_FLAG: &str = "--help-all";
pub const HELP_PLUGIN_FLAG: &str = "--help-plugin";

/// Ordered argument groups.
///
/// The global group holds the tokens before the first recognised plugin
/// name. Each plugin group starts with the canonical plugin name, followed
/// by the tokens up to the next recognised name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgGroups {
    global: Vec<String>,
    plugins: Vec<Vec<String>>,
}

impl ArgGroups {
    pub fn global(&self) -> &[String] {
        &self.global
    }

    pub fn plugins(&self) -> &[Vec<String>] {
        &self.plugins
    }

    /// Group by key: `""` is the global group, `"0"`, `"1"`, ... the plugin
    /// groups in command-line order.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        if key.is_empty() {
            return Some(&self.global);
        }
        let index: usize = key.parse().ok()?;
        self.plugins.get(index).map(Vec::as_slice)
    }

    /// Group keys in order, global first.
    pub fn keys(&self) -> Vec<String> {
        std::iter::once(String::new())
            .chain((0..self.plugins.len()).map(|i| i.to_string()))
            .collect()
    }

    /// Canonical plugin names in order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins
            .iter()
            .filter_map(|g| g.first().map(String::as_str))
            .collect()
    }
}

/// Partitions `args` into groups. A token starts a new plugin group when
/// the resolver recognises it; the group stores the resolved name, not the
/// raw token.
pub fn split_args(args: &[String], resolver: &NameResolver) -> ArgGroups {
    let mut groups = ArgGroups::default();

    for arg in args {
        match resolver.resolve(arg) {
            Some(name) => groups.plugins.push(vec![name.to_string()]),
            None => match groups.plugins.last_mut() {
                Some(group) => group.push(arg.clone()),
                None => groups.global.push(arg.clone()),
            },
        }
    }

    groups
}

/// Help flags found on a command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelpRequest {
    pub requested: bool,
    pub all_details: bool,
    pub plugin: Option<String>,
}

/// Scans `args` for `-h`/`--help`, `--help-all` and `--help-plugin NAME`.
///
/// The first help flag found decides the request. `--help-plugin` takes
/// the next token, whatever it is, as the plugin name; without one it still
/// counts as a request.
pub fn is_help_requested(args: &[String]) -> HelpRequest {
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if HELP_FLAGS.contains(&arg.as_str()) {
            return HelpRequest {
                requested: true,
                ..HelpRequest::default()
            };
        }
        if arg == HELP_ALL_FLAG {
            return HelpRequest {
                requested: true,
                all_details: true,
                plugin: None,
            };
        }
        if arg == HELP_PLUGIN_FLAG {
            return HelpRequest {
                requested: true,
                all_details: false,
                plugin: iter.next().cloned(),
            };
        }
    }

    HelpRequest::default()
}
