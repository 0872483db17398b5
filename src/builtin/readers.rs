use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

use crate::builtin::LINE;
use crate::error::{ConfigurationError, ProcessingError};
use crate::pipeline::{expand_placeholders, Reader, Session};
use crate::plugin::{OptionDef, OutputProducer, ParsedOption, Plugin, TypeTag};

const STDIN: &str = "-";

/// Reads text files line by line, one file after the other.
#[derive(Default)]
pub struct FromLines {
    inputs: Vec<String>,
    pending: VecDeque<String>,
    current: Option<Lines<Box<dyn BufRead>>>,
}

impl FromLines {
    fn open(&self, input: &str) -> Result<Box<dyn BufRead>, ProcessingError> {
        if input == STDIN {
            return Ok(Box::new(std::io::stdin().lock()));
        }
        let file = File::open(input)
            .map_err(|e| ProcessingError::stage(self.name(), format!("Failed to open '{}': {}", input, e)))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

impl Plugin for FromLines {
    fn name(&self) -> &str {
        "from-lines"
    }

    fn description(&self) -> &str {
        "Reads text files line by line. Use '-' to read from stdin."
    }

    fn aliases(&self) -> &[&'static str] {
        &["lines"]
    }

    fn options(&self) -> Vec<OptionDef> {
        vec![OptionDef::multiple("--input", "The files to read; supports placeholders")
            .short("-i")
            .metavar("FILE")]
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        if option.is("--input") {
            self.inputs.extend(option.values.iter().cloned());
        }
        Ok(())
    }
}

impl OutputProducer for FromLines {
    fn generates(&self) -> Vec<TypeTag> {
        vec![LINE]
    }
}

impl Reader<String> for FromLines {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        if self.inputs.is_empty() {
            return Err(ConfigurationError::MissingValue {
                option: "--input".to_string(),
            }
            .into());
        }
        self.pending = self
            .inputs
            .iter()
            .map(|input| expand_placeholders(input, None))
            .collect();
        self.current = None;
        Ok(())
    }

    fn read(&mut self, session: &Session) -> Result<Option<String>, ProcessingError> {
        loop {
            if let Some(lines) = &mut self.current {
                match lines.next() {
                    Some(line) => return Ok(Some(line?)),
                    None => self.current = None,
                }
            }
            let Some(input) = self.pending.pop_front() else {
                return Ok(None);
            };
            tracing::info!(input = %input, "Reading");
            self.current = Some(self.open(&input)?.lines());
            session.set_current_input(Some(input));
        }
    }

    fn has_finished(&self) -> bool {
        self.current.is_none() && self.pending.is_empty()
    }

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.current = None;
        self.pending.clear();
        Ok(())
    }
}

/// Generates numbered items, optionally without end.
pub struct Generate {
    count: u64,
    infinite: bool,
    prefix: String,
    produced: u64,
}

impl Default for Generate {
    fn default() -> Self {
        Self {
            count: 10,
            infinite: false,
            prefix: "item-".to_string(),
            produced: 0,
        }
    }
}

impl Plugin for Generate {
    fn name(&self) -> &str {
        "generate"
    }

    fn description(&self) -> &str {
        "Generates numbered text items."
    }

    fn options(&self) -> Vec<OptionDef> {
        vec![
            OptionDef::value("--count", "The number of items to generate")
                .short("-n")
                .default_value(self.count),
            OptionDef::flag("--infinite", "Keeps generating until stopped"),
            OptionDef::value("--prefix", "The text to prefix the item number with")
                .default_value(&self.prefix),
        ]
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        match option.flag.as_str() {
            "--count" => self.count = option.parse()?,
            "--infinite" => self.infinite = true,
            "--prefix" => self.prefix = option.require_value()?.to_string(),
            _ => {}
        }
        Ok(())
    }
}

impl OutputProducer for Generate {
    fn generates(&self) -> Vec<TypeTag> {
        vec![LINE]
    }
}

impl Reader<String> for Generate {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.produced = 0;
        Ok(())
    }

    fn read(&mut self, _session: &Session) -> Result<Option<String>, ProcessingError> {
        if self.has_finished() {
            return Ok(None);
        }
        self.produced += 1;
        Ok(Some(format!("{}{}", self.prefix, self.produced)))
    }

    fn has_finished(&self) -> bool {
        !self.infinite && self.produced >= self.count
    }

    fn is_infinite(&self) -> bool {
        self.infinite
    }
}
