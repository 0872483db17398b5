//! The plugin contract.
//!
//! A plugin is a named, self-describing unit that configures itself from its
//! own slice of the command line. Optional capabilities are exposed through
//! accessor methods, so callers test for the presence of a capability rather
//! than for a concrete type.

pub mod help;
pub mod options;
pub mod types;

pub use help::{enumerate_plugins, generate_help, plugin_usage, HelpFormat};
pub use options::{parse_options, OptionArity, OptionDef, ParseResult, ParsedOption, SKIP_OPTION};
pub use types::{TypeTag, ANY};

use crate::error::ConfigurationError;

/// Something that accepts data of the listed types.
pub trait InputConsumer {
    fn accepts(&self) -> Vec<TypeTag>;
}

/// Something that produces data of the listed types.
pub trait OutputProducer {
    fn generates(&self) -> Vec<TypeTag>;
}

pub trait Plugin {
    /// Primary command-line name. Unique across the registry.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Alternative names; must not collide with any other plugin's names.
    fn aliases(&self) -> &[&'static str] {
        &[]
    }

    /// Options understood by [`Plugin::configure`]. Values rendered as
    /// defaults reflect the current state.
    fn options(&self) -> Vec<OptionDef> {
        Vec::new()
    }

    /// Applies one recognised option.
    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        Err(ConfigurationError::Invalid(format!(
            "{}: option {} is declared but not handled",
            self.name(),
            option.flag
        )))
    }

    /// Parses this plugin's arguments and applies them, returning the
    /// tokens no option consumed.
    fn configure(&mut self, args: &[String]) -> Result<Vec<String>, ConfigurationError> {
        let defs = self.options();
        let parsed = parse_options(args, &defs)?;
        for option in &parsed.options {
            self.apply_option(option)?;
        }
        Ok(parsed.unconsumed)
    }

    /// Set by the shared `--skip` flag; skipped plugins are dropped from a chain.
    fn is_skipped(&self) -> bool {
        false
    }

    fn as_input_consumer(&self) -> Option<&dyn InputConsumer> {
        None
    }

    fn as_output_producer(&self) -> Option<&dyn OutputProducer> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Echo {
        word: String,
        skip: bool,
    }

    impl Plugin for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Repeats a word."
        }

        fn options(&self) -> Vec<OptionDef> {
            vec![
                OptionDef::skip(),
                OptionDef::value("--word", "Word to repeat").short("-w"),
            ]
        }

        fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
            match option.flag.as_str() {
                SKIP_OPTION => self.skip = true,
                "--word" => self.word = option.require_value()?.to_string(),
                _ => {}
            }
            Ok(())
        }

        fn is_skipped(&self) -> bool {
            self.skip
        }
    }

    #[test]
    fn test_configure_applies_options_and_returns_leftovers() {
        let mut echo = Echo::default();
        let args: Vec<String> = ["-w", "hi", "extra"].iter().map(|s| s.to_string()).collect();
        let rest = echo.configure(&args).unwrap();
        assert_eq!(echo.word, "hi");
        assert_eq!(rest, vec!["extra"]);
        assert!(!echo.is_skipped());
    }

    #[test]
    fn test_capabilities_absent_by_default() {
        let echo = Echo::default();
        assert!(echo.as_input_consumer().is_none());
        assert!(echo.as_output_producer().is_none());
    }
}
