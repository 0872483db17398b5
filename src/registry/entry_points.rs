//! Externally declared entry points: `name=module:attribute` strings
//! grouped under a name such as `stagehand.readers`.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;

/// One parsed declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub name: String,
    pub module: String,
    pub attribute: String,
}

impl FromStr for EntryPoint {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DiscoveryError::MalformedEntryPoint(s.to_string());
        let (name, target) = s.split_once('=').ok_or_else(malformed)?;
        let (module, attribute) = target.split_once(':').ok_or_else(malformed)?;
        let (name, module, attribute) = (name.trim(), module.trim(), attribute.trim());
        if name.is_empty() || module.is_empty() || attribute.is_empty() {
            return Err(malformed());
        }
        Ok(Self {
            name: name.to_string(),
            module: module.to_string(),
            attribute: attribute.to_string(),
        })
    }
}

/// Supplies the declarations for a group.
pub trait EntryPointSource {
    fn entry_points(&self, group: &str) -> Vec<String>;
}

/// Group name → declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryPoints {
    groups: BTreeMap<String, Vec<String>>,
}

impl EntryPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(mut self, group: impl Into<String>, declaration: impl Into<String>) -> Self {
        self.groups
            .entry(group.into())
            .or_default()
            .push(declaration.into());
        self
    }

    /// Parses a JSON object of group → list of declarations.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.groups
    }
}

impl EntryPointSource for EntryPoints {
    fn entry_points(&self, group: &str) -> Vec<String> {
        self.groups.get(group).cloned().unwrap_or_default()
    }
}

/// Generates entry-point declarations for plugin classes.
///
/// `classes` maps group → fully qualified `module.Class` names; `name_of`
/// returns a plugin's command-line name for a class, or `None` to leave the
/// class out. The result is a JSON object of group → sorted declarations,
/// suitable for [`EntryPoints::from_json`].
pub fn generate_entry_points<F>(
    classes: &BTreeMap<String, Vec<String>>,
    name_of: F,
) -> Result<String, serde_json::Error>
where
    F: Fn(&str) -> Option<String>,
{
    let mut entry_points = EntryPoints::new();
    for (group, class_names) in classes {
        let mut declarations: Vec<String> = class_names
            .iter()
            .filter_map(|class_name| {
                let (module, attribute) = class_name.rsplit_once('.')?;
                let name = name_of(class_name)?;
                Some(format!("{}={}:{}", name, module, attribute))
            })
            .collect();
        declarations.sort();
        for declaration in declarations {
            entry_points = entry_points.declare(group.clone(), declaration);
        }
    }
    serde_json::to_string_pretty(&entry_points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declaration() {
        let ep: EntryPoint = "upper=app.filters:Upper".parse().unwrap();
        assert_eq!(ep.name, "upper");
        assert_eq!(ep.module, "app.filters");
        assert_eq!(ep.attribute, "Upper");
    }

    #[test]
    fn test_malformed_declarations() {
        for bad in ["upper", "upper=app.filters", "=a:b", "x=:b"] {
            assert!(bad.parse::<EntryPoint>().is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_generate_and_reload() {
        let classes = BTreeMap::from([(
            "app.filters".to_string(),
            vec!["app.f.Upper".to_string(), "app.f.Hidden".to_string()],
        )]);
        let json = generate_entry_points(&classes, |c| {
            (!c.ends_with("Hidden")).then(|| "upper".to_string())
        })
        .unwrap();
        let reloaded = EntryPoints::from_json(&json).unwrap();
        assert_eq!(
            reloaded.entry_points("app.filters"),
            vec!["upper=app.f:Upper"]
        );
        assert!(reloaded.entry_points("other").is_empty());
    }
}
