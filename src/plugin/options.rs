//! Option definitions and the parser that applies them to one plugin's
//! slice of the command line.

use std::str::FromStr;

use crate::error::ConfigurationError;

/// Long form of the flag every skippable plugin understands.
pub const SKIP_OPTION: &str = "--skip";

/// Whether an option takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionArity {
    /// Boolean flag, no value (e.g., --ignore-case).
    NoValue,
    /// Requires exactly one value (e.g., --pattern REGEXP).
    RequiresValue,
    /// Optional value, present or absent.
    OptionalValue,
    /// One or more values, up to the next flag (e.g., --input A B C).
    MultipleValues,
}

/// A single option definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDef {
    /// Primary long form (e.g., "--pattern").
    pub long: &'static str,
    /// Optional short form (e.g., "-p").
    pub short: Option<&'static str>,
    pub arity: OptionArity,
    /// Placeholder shown in help for the value (defaults to the upper-cased long name).
    pub metavar: Option<&'static str>,
    /// Human-readable description for help text.
    pub description: &'static str,
    /// Current value rendered for help text.
    pub default: Option<String>,
}

impl OptionDef {
    fn new(long: &'static str, arity: OptionArity, description: &'static str) -> Self {
        Self {
            long,
            short: None,
            arity,
            metavar: None,
            description,
            default: None,
        }
    }

    pub fn flag(long: &'static str, description: &'static str) -> Self {
        Self::new(long, OptionArity::NoValue, description)
    }

    pub fn value(long: &'static str, description: &'static str) -> Self {
        Self::new(long, OptionArity::RequiresValue, description)
    }

    pub fn optional(long: &'static str, description: &'static str) -> Self {
        Self::new(long, OptionArity::OptionalValue, description)
    }

    pub fn multiple(long: &'static str, description: &'static str) -> Self {
        Self::new(long, OptionArity::MultipleValues, description)
    }

    /// The shared `--skip` flag.
    pub fn skip() -> Self {
        Self::flag(SKIP_OPTION, "Disables the plugin, removing it from the pipeline.")
    }

    pub fn short(mut self, short: &'static str) -> Self {
        self.short = Some(short);
        self
    }

    pub fn metavar(mut self, metavar: &'static str) -> Self {
        self.metavar = Some(metavar);
        self
    }

    pub fn default_value(mut self, default: impl ToString) -> Self {
        self.default = Some(default.to_string());
        self
    }

    /// Check if an argument matches this option (long or short form).
    pub fn matches(&self, arg: &str) -> bool {
        arg == self.long || self.short == Some(arg)
    }

    /// Value placeholder for help output.
    pub fn value_name(&self) -> String {
        match self.metavar {
            Some(m) => m.to_string(),
            None => self
                .long
                .trim_start_matches('-')
                .replace('-', "_")
                .to_uppercase(),
        }
    }
}

/// An option recognised in the arguments, normalised to its long form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOption {
    pub flag: String,
    pub values: Vec<String>,
}

impl ParsedOption {
    pub fn is(&self, long: &str) -> bool {
        self.flag == long
    }

    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub fn require_value(&self) -> Result<&str, ConfigurationError> {
        self.value().ok_or_else(|| ConfigurationError::MissingValue {
            option: self.flag.clone(),
        })
    }

    pub fn parse<T>(&self) -> Result<T, ConfigurationError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.require_value()?;
        raw.parse()
            .map_err(|e| ConfigurationError::invalid_value(&self.flag, raw, e))
    }

    pub fn parse_all<T>(&self) -> Result<Vec<T>, ConfigurationError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.values
            .iter()
            .map(|raw| {
                raw.parse()
                    .map_err(|e| ConfigurationError::invalid_value(&self.flag, raw, e))
            })
            .collect()
    }
}

/// Result of parsing a plugin's arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    /// Recognised options in order.
    pub options: Vec<ParsedOption>,
    /// Tokens that no option consumed, in order.
    pub unconsumed: Vec<String>,
}

/// Negative numbers are values, not flags.
fn looks_like_flag(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    !rest.is_empty() && !rest.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

/// Parse `args` against `defs`.
///
/// Unknown flags, and the single value that follows them, are collected as
/// unconsumed rather than rejected; the caller decides whether that is fatal.
/// `--long=value` is accepted for options that take a value.
pub fn parse_options(args: &[String], defs: &[OptionDef]) -> Result<ParseResult, ConfigurationError> {
    let mut result = ParseResult::default();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        if !looks_like_flag(arg) {
            result.unconsumed.push(arg.clone());
            continue;
        }

        let (name, inline) = match arg.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };

        let Some(def) = defs.iter().find(|d| d.matches(name)) else {
            result.unconsumed.push(arg.clone());
            if inline.is_none() {
                if let Some(next) = iter.next_if(|next| !looks_like_flag(next)) {
                    result.unconsumed.push(next.clone());
                }
            }
            continue;
        };

        let flag = def.long.to_string();
        let mut values = Vec::new();
        match def.arity {
            OptionArity::NoValue => {
                if inline.is_some() {
                    return Err(ConfigurationError::invalid_value(
                        flag,
                        arg.as_str(),
                        "option does not take a value",
                    ));
                }
            }
            OptionArity::RequiresValue => match inline {
                Some(value) => values.push(value),
                None => match iter.next_if(|next| !looks_like_flag(next)) {
                    Some(next) => values.push(next.clone()),
                    None => return Err(ConfigurationError::MissingValue { option: flag }),
                },
            },
            OptionArity::OptionalValue => match inline {
                Some(value) => values.push(value),
                None => values.extend(iter.next_if(|next| !looks_like_flag(next)).cloned()),
            },
            OptionArity::MultipleValues => {
                values.extend(inline);
                while let Some(next) = iter.next_if(|next| !looks_like_flag(next)) {
                    values.push(next.clone());
                }
                if values.is_empty() {
                    return Err(ConfigurationError::MissingValue { option: flag });
                }
            }
        }

        result.options.push(ParsedOption { flag, values });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn defs() -> Vec<OptionDef> {
        vec![
            OptionDef::skip(),
            OptionDef::value("--pattern", "Pattern").short("-p"),
            OptionDef::optional("--level", "Level"),
            OptionDef::multiple("--input", "Inputs").short("-i"),
        ]
    }

    #[test]
    fn test_short_flag_normalized_to_long() {
        let result = parse_options(&args(&["-p", "abc"]), &defs()).unwrap();
        assert_eq!(result.options[0].flag, "--pattern");
        assert_eq!(result.options[0].value(), Some("abc"));
    }

    #[test]
    fn test_missing_required_value() {
        let err = parse_options(&args(&["--pattern", "--skip"]), &defs()).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingValue { .. }));
    }

    #[test]
    fn test_optional_value_absent() {
        let result = parse_options(&args(&["--level", "--skip"]), &defs()).unwrap();
        assert!(result.options[0].values.is_empty());
        assert!(result.options[1].is(SKIP_OPTION));
    }

    #[test]
    fn test_multiple_values_stop_at_next_flag() {
        let result = parse_options(&args(&["-i", "a", "b", "--skip"]), &defs()).unwrap();
        assert_eq!(result.options[0].values, vec!["a", "b"]);
        assert_eq!(result.options.len(), 2);
    }

    #[test]
    fn test_unknown_flag_and_value_unconsumed() {
        let result = parse_options(&args(&["--bogus", "x", "stray", "--skip"]), &defs()).unwrap();
        assert_eq!(result.unconsumed, vec!["--bogus", "x", "stray"]);
        assert_eq!(result.options.len(), 1);
    }

    #[test]
    fn test_inline_value_and_negative_numbers() {
        let result = parse_options(&args(&["--pattern=a=b", "--level", "-3"]), &defs()).unwrap();
        assert_eq!(result.options[0].value(), Some("a=b"));
        assert_eq!(result.options[1].parse::<i32>().unwrap(), -3);
    }

    #[test]
    fn test_parse_reports_bad_value() {
        let parsed = ParsedOption {
            flag: "--count".into(),
            values: vec!["ten".into()],
        };
        let err = parsed.parse::<u32>().unwrap_err();
        assert!(err.to_string().contains("--count"));
    }
}
