//! A pipeline stage of any role, as produced by discovery and the command line.

use crate::error::ConfigurationError;
use crate::pipeline::filter::FilterStage;
use crate::pipeline::reader::Reader;
use crate::pipeline::writer::WriterStage;
use crate::plugin::{InputConsumer, OptionDef, OutputProducer, ParsedOption, Plugin, TypeTag};

/// Base-class names stages are discovered under.
pub const READER_BASE: &str = "Reader";
pub const FILTER_BASE: &str = "Filter";
pub const STREAM_FILTER_BASE: &str = "StreamFilter";
pub const WRITER_BASE: &str = "Writer";
pub const STREAM_WRITER_BASE: &str = "StreamWriter";
pub const BATCH_WRITER_BASE: &str = "BatchWriter";

pub enum Stage<T> {
    Reader(Box<dyn Reader<T>>),
    Filter(FilterStage<T>),
    Writer(WriterStage<T>),
}

macro_rules! with_stage {
    ($stage:expr, $s:ident => $body:expr) => {
        match $stage {
            Stage::Reader($s) => $body,
            Stage::Filter($s) => $body,
            Stage::Writer($s) => $body,
        }
    };
}

impl<T> Stage<T> {
    pub fn reader<R: Reader<T> + 'static>(reader: R) -> Self {
        Stage::Reader(Box::new(reader))
    }

    pub fn role(&self) -> &'static str {
        match self {
            Stage::Reader(_) => "reader",
            Stage::Filter(_) => "filter",
            Stage::Writer(_) => "writer",
        }
    }
}

impl<T> From<FilterStage<T>> for Stage<T> {
    fn from(filter: FilterStage<T>) -> Self {
        Stage::Filter(filter)
    }
}

impl<T> From<WriterStage<T>> for Stage<T> {
    fn from(writer: WriterStage<T>) -> Self {
        Stage::Writer(writer)
    }
}

impl<T> Plugin for Stage<T> {
    fn name(&self) -> &str {
        with_stage!(self, s => s.name())
    }

    fn description(&self) -> &str {
        with_stage!(self, s => s.description())
    }

    fn aliases(&self) -> &[&'static str] {
        with_stage!(self, s => s.aliases())
    }

    fn options(&self) -> Vec<OptionDef> {
        with_stage!(self, s => s.options())
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        with_stage!(self, s => s.apply_option(option))
    }

    fn configure(&mut self, args: &[String]) -> Result<Vec<String>, ConfigurationError> {
        with_stage!(self, s => s.configure(args))
    }

    fn is_skipped(&self) -> bool {
        with_stage!(self, s => s.is_skipped())
    }

    fn as_input_consumer(&self) -> Option<&dyn InputConsumer> {
        match self {
            Stage::Reader(_) => None,
            _ => Some(self),
        }
    }

    fn as_output_producer(&self) -> Option<&dyn OutputProducer> {
        match self {
            Stage::Writer(_) => None,
            _ => Some(self),
        }
    }
}

impl<T> InputConsumer for Stage<T> {
    fn accepts(&self) -> Vec<TypeTag> {
        match self {
            Stage::Reader(_) => Vec::new(),
            Stage::Filter(f) => f.accepts(),
            Stage::Writer(w) => w.accepts(),
        }
    }
}

impl<T> OutputProducer for Stage<T> {
    fn generates(&self) -> Vec<TypeTag> {
        match self {
            Stage::Reader(r) => r.generates(),
            Stage::Filter(f) => f.generates(),
            Stage::Writer(_) => Vec::new(),
        }
    }
}
