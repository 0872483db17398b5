//! Deterministic assignment of items to named splits (e.g. train/test).

use std::collections::{BTreeMap, HashMap};

use regex::Regex;

use crate::error::ConfigurationError;
use crate::plugin::{OptionDef, ParsedOption};

pub const SPLIT_RATIOS_OPTION: &str = "--split-ratios";
pub const SPLIT_NAMES_OPTION: &str = "--split-names";
pub const SPLIT_GROUP_OPTION: &str = "--split-group";

/// Greatest common divisor of all values; `None` for an empty slice.
pub fn gcd(values: &[u32]) -> Option<u32> {
    fn pair(mut a: u32, mut b: u32) -> u32 {
        while b != 0 {
            (a, b) = (b, a % b);
        }
        a
    }
    values.iter().copied().reduce(pair)
}

/// Cycles through named splits following integer ratios that sum to 100.
///
/// Ratios are reduced by their common divisor, so `[70, 30]` assigns seven
/// items to the first split, then three to the second, and repeats. With a
/// group pattern, items whose first capture group matches an earlier item
/// go to that item's split without advancing the cycle.
#[derive(Debug, Clone)]
pub struct Splitter {
    ratios: Vec<u32>,
    names: Vec<String>,
    group: Option<String>,
    group_regex: Option<Regex>,
    schedule: Vec<u32>,
    counter: u32,
    stats: BTreeMap<String, usize>,
    groups: HashMap<String, String>,
}

impl Splitter {
    pub fn new(ratios: Vec<u32>, names: Vec<String>, group: Option<String>) -> Self {
        Self {
            ratios,
            names,
            group,
            group_regex: None,
            schedule: Vec::new(),
            counter: 0,
            stats: BTreeMap::new(),
            groups: HashMap::new(),
        }
    }

    /// Validates the configuration and builds the schedule.
    pub fn initialize(&mut self) -> Result<(), ConfigurationError> {
        if self.ratios.is_empty() {
            return Err(ConfigurationError::InvalidSplit("No split ratios defined".to_string()));
        }
        if self.names.is_empty() {
            return Err(ConfigurationError::InvalidSplit("No split names defined".to_string()));
        }
        if self.ratios.len() != self.names.len() {
            return Err(ConfigurationError::InvalidSplit(format!(
                "Differing number of split ratios and names: {} != {}",
                self.ratios.len(),
                self.names.len()
            )));
        }
        let sum: u32 = self.ratios.iter().sum();
        if sum != 100 {
            return Err(ConfigurationError::InvalidSplit(format!(
                "Split ratios must sum up to 100, but got: {}",
                sum
            )));
        }

        // zeros do not affect the divisor; a zero-width split is never chosen
        let divisor = gcd(&self.ratios).unwrap_or(1).max(1);
        self.schedule = std::iter::once(0)
            .chain(self.ratios.iter().scan(0, |total, ratio| {
                *total += ratio / divisor;
                Some(*total)
            }))
            .collect();

        self.group_regex = match &self.group {
            Some(pattern) => {
                let regex = Regex::new(&format!("^(?:{})", pattern))
                    .map_err(|e| ConfigurationError::invalid_value(SPLIT_GROUP_OPTION, pattern, e))?;
                if regex.captures_len() < 2 {
                    return Err(ConfigurationError::invalid_value(
                        SPLIT_GROUP_OPTION,
                        pattern,
                        "pattern must contain a capture group",
                    ));
                }
                Some(regex)
            }
            None => None,
        };

        self.reset();
        Ok(())
    }

    /// Clears the position in the cycle, the statistics and the group assignments.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.stats.clear();
        self.groups.clear();
    }

    /// Split for the next item.
    ///
    /// `item` is only consulted for the group pattern.
    pub fn next(&mut self, item: Option<&str>) -> Result<String, ConfigurationError> {
        let Some(&cycle) = self.schedule.last() else {
            return Err(ConfigurationError::InvalidSplit("Splitter has not been initialized".to_string()));
        };

        let group = match (&self.group_regex, item) {
            (Some(regex), Some(item)) => regex
                .captures(item)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string()),
            _ => None,
        };
        if let Some(split) = group.as_ref().and_then(|g| self.groups.get(g)) {
            return Ok(split.clone());
        }

        let index = self
            .schedule
            .windows(2)
            .position(|w| self.counter >= w[0] && self.counter < w[1])
            .unwrap_or(0);
        let split = self.names[index].clone();

        self.counter += 1;
        if self.counter == cycle {
            self.counter = 0;
        }
        *self.stats.entry(split.clone()).or_insert(0) += 1;
        if let Some(group) = group {
            self.groups.insert(group, split.clone());
        }
        Ok(split)
    }

    /// Position within the current cycle.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Items assigned per split by the cycle (group repeats excluded).
    pub fn stats(&self) -> &BTreeMap<String, usize> {
        &self.stats
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// The `--split-*` options a writer can offer, collected while configuring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitSettings {
    pub ratios: Option<Vec<u32>>,
    pub names: Option<Vec<String>>,
    pub group: Option<String>,
}

impl SplitSettings {
    pub fn options() -> Vec<OptionDef> {
        vec![
            OptionDef::multiple(SPLIT_RATIOS_OPTION, "The split ratios to use for generating the splits (must sum up to 100)")
                .metavar("SPLIT_RATIO"),
            OptionDef::multiple(SPLIT_NAMES_OPTION, "The names to use for the splits")
                .metavar("SPLIT_NAME"),
            OptionDef::value(SPLIT_GROUP_OPTION, "The regular expression with a single group used for keeping items in the same split, e.g., for identifying the base name of a file or the sample ID")
                .metavar("SPLIT_GROUP"),
        ]
    }

    /// Applies `option` if it is a split option; returns whether it was.
    pub fn apply(&mut self, option: &ParsedOption) -> Result<bool, ConfigurationError> {
        match option.flag.as_str() {
            SPLIT_RATIOS_OPTION => self.ratios = Some(option.parse_all()?),
            SPLIT_NAMES_OPTION => self.names = Some(option.values.clone()),
            SPLIT_GROUP_OPTION => self.group = Some(option.require_value()?.to_string()),
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn is_configured(&self) -> bool {
        self.ratios.is_some() || self.names.is_some()
    }

    /// An initialized splitter, or `None` when no split options were given.
    pub fn build(&self) -> Result<Option<Splitter>, ConfigurationError> {
        if !self.is_configured() {
            return Ok(None);
        }
        let mut splitter = Splitter::new(
            self.ratios.clone().unwrap_or_default(),
            self.names.clone().unwrap_or_default(),
            self.group.clone(),
        );
        splitter.initialize()?;
        Ok(Some(splitter))
    }
}
