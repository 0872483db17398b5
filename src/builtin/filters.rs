use regex::{Regex, RegexBuilder};

use crate::builtin::{LINE, WORD};
use crate::error::{ConfigurationError, ProcessingError};
use crate::pipeline::{BatchFilter, Data, Session, StreamBuffer, StreamFilter};
use crate::plugin::{
    InputConsumer, OptionDef, OutputProducer, ParsedOption, Plugin, TypeTag, ANY, SKIP_OPTION,
};

/// Upper-cases every item.
#[derive(Debug, Default)]
pub struct Upper {
    skip: bool,
}

impl Plugin for Upper {
    fn name(&self) -> &str {
        "upper"
    }

    fn description(&self) -> &str {
        "Converts the text to upper case."
    }

    fn options(&self) -> Vec<OptionDef> {
        vec![OptionDef::skip()]
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        if option.is(SKIP_OPTION) {
            self.skip = true;
        }
        Ok(())
    }

    fn is_skipped(&self) -> bool {
        self.skip
    }

    fn as_input_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }

    fn as_output_producer(&self) -> Option<&dyn OutputProducer> {
        Some(self)
    }
}

impl InputConsumer for Upper {
    fn accepts(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl OutputProducer for Upper {
    fn generates(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl BatchFilter<String> for Upper {
    fn do_process(&mut self, data: Data<String>, _session: &Session) -> Result<Option<Data<String>>, ProcessingError> {
        Ok(Some(match data {
            Data::Item(item) => Data::Item(item.to_uppercase()),
            Data::Batch(items) => Data::Batch(items.iter().map(|i| i.to_uppercase()).collect()),
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrepAction {
    Keep,
    Discard,
}

impl std::str::FromStr for GrepAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(GrepAction::Keep),
            "discard" => Ok(GrepAction::Discard),
            other => Err(format!("expected 'keep' or 'discard', got '{}'", other)),
        }
    }
}

impl std::fmt::Display for GrepAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GrepAction::Keep => "keep",
            GrepAction::Discard => "discard",
        })
    }
}

/// Keeps or discards items matching a regular expression.
#[derive(Debug)]
pub struct Grep {
    pattern: Option<String>,
    action: GrepAction,
    ignore_case: bool,
    skip: bool,
    regex: Option<Regex>,
}

impl Default for Grep {
    fn default() -> Self {
        Self {
            pattern: None,
            action: GrepAction::Keep,
            ignore_case: false,
            skip: false,
            regex: None,
        }
    }
}

impl Grep {
    fn passes(&self, item: &str) -> bool {
        let found = self.regex.as_ref().is_some_and(|r| r.is_match(item));
        match self.action {
            GrepAction::Keep => found,
            GrepAction::Discard => !found,
        }
    }
}

impl Plugin for Grep {
    fn name(&self) -> &str {
        "grep"
    }

    fn description(&self) -> &str {
        "Keeps or discards items that match a regular expression."
    }

    fn options(&self) -> Vec<OptionDef> {
        vec![
            OptionDef::skip(),
            OptionDef::value("--pattern", "The regular expression to look for")
                .short("-p")
                .metavar("REGEXP"),
            OptionDef::value("--action", "What to do with matching items: keep|discard")
                .short("-a")
                .default_value(self.action),
            OptionDef::flag("--ignore-case", "Matches case-insensitively").short("-i"),
        ]
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        match option.flag.as_str() {
            SKIP_OPTION => self.skip = true,
            "--pattern" => self.pattern = Some(option.require_value()?.to_string()),
            "--action" => self.action = option.parse()?,
            "--ignore-case" => self.ignore_case = true,
            _ => {}
        }
        Ok(())
    }

    fn is_skipped(&self) -> bool {
        self.skip
    }

    fn as_input_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }

    fn as_output_producer(&self) -> Option<&dyn OutputProducer> {
        Some(self)
    }
}

impl InputConsumer for Grep {
    fn accepts(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl OutputProducer for Grep {
    fn generates(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl BatchFilter<String> for Grep {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        let pattern = self.pattern.as_deref().ok_or_else(|| ConfigurationError::MissingValue {
            option: "--pattern".to_string(),
        })?;
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(self.ignore_case)
            .build()
            .map_err(|e| ConfigurationError::invalid_value("--pattern", pattern, e))?;
        self.regex = Some(regex);
        Ok(())
    }

    fn do_process(&mut self, data: Data<String>, _session: &Session) -> Result<Option<Data<String>>, ProcessingError> {
        let kept: Vec<String> = data.into_vec().into_iter().filter(|i| self.passes(i)).collect();
        Ok(Data::from_vec(kept))
    }
}

/// Passes on the first N items and drops the rest.
#[derive(Debug)]
pub struct Take {
    count: usize,
    seen: usize,
    skip: bool,
}

impl Default for Take {
    fn default() -> Self {
        Self {
            count: 10,
            seen: 0,
            skip: false,
        }
    }
}

impl Plugin for Take {
    fn name(&self) -> &str {
        "take"
    }

    fn description(&self) -> &str {
        "Only lets the first N items through."
    }

    fn aliases(&self) -> &[&'static str] {
        &["head"]
    }

    fn options(&self) -> Vec<OptionDef> {
        vec![
            OptionDef::skip(),
            OptionDef::value("--count", "The number of items to let through")
                .short("-n")
                .default_value(self.count),
        ]
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        match option.flag.as_str() {
            SKIP_OPTION => self.skip = true,
            "--count" => self.count = option.parse()?,
            _ => {}
        }
        Ok(())
    }

    fn is_skipped(&self) -> bool {
        self.skip
    }

    fn as_input_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }

    fn as_output_producer(&self) -> Option<&dyn OutputProducer> {
        Some(self)
    }
}

impl InputConsumer for Take {
    fn accepts(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl OutputProducer for Take {
    fn generates(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl BatchFilter<String> for Take {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.seen = 0;
        Ok(())
    }

    fn do_process(&mut self, data: Data<String>, _session: &Session) -> Result<Option<Data<String>>, ProcessingError> {
        let remaining = self.count.saturating_sub(self.seen);
        let kept: Vec<String> = data.into_vec().into_iter().take(remaining).collect();
        self.seen += kept.len();
        Ok(Data::from_vec(kept))
    }
}

/// Splits each line into words, emitting one item per word.
#[derive(Debug)]
pub struct SplitWords {
    min_length: usize,
    skip: bool,
    buffer: StreamBuffer<String>,
}

impl Default for SplitWords {
    fn default() -> Self {
        Self {
            min_length: 1,
            skip: false,
            buffer: StreamBuffer::default(),
        }
    }
}

impl Plugin for SplitWords {
    fn name(&self) -> &str {
        "split-words"
    }

    fn description(&self) -> &str {
        "Splits lines on whitespace and forwards the words one by one."
    }

    fn options(&self) -> Vec<OptionDef> {
        vec![
            OptionDef::skip(),
            OptionDef::value("--min-length", "Words shorter than this are dropped")
                .short("-m")
                .default_value(self.min_length),
        ]
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        match option.flag.as_str() {
            SKIP_OPTION => self.skip = true,
            "--min-length" => self.min_length = option.parse()?,
            _ => {}
        }
        Ok(())
    }

    fn is_skipped(&self) -> bool {
        self.skip
    }

    fn as_input_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }

    fn as_output_producer(&self) -> Option<&dyn OutputProducer> {
        Some(self)
    }
}

impl InputConsumer for SplitWords {
    fn accepts(&self) -> Vec<TypeTag> {
        vec![LINE]
    }
}

impl OutputProducer for SplitWords {
    fn generates(&self) -> Vec<TypeTag> {
        vec![WORD]
    }
}

impl StreamFilter<String> for SplitWords {
    fn buffer(&self) -> &StreamBuffer<String> {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut StreamBuffer<String> {
        &mut self.buffer
    }

    fn do_process_stream(&mut self, data: Data<String>, _session: &Session) -> Result<(), ProcessingError> {
        for line in data.into_vec() {
            for word in line.split_whitespace() {
                if word.chars().count() >= self.min_length {
                    self.buffer.push_item(word.to_string());
                }
            }
        }
        Ok(())
    }
}
