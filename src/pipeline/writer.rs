use crate::error::{ConfigurationError, ProcessingError};
use crate::pipeline::data::Data;
use crate::pipeline::session::Session;
use crate::plugin::{InputConsumer, OptionDef, ParsedOption, Plugin, TypeTag};

/// Sink that consumes data as it arrives.
pub trait StreamWriter<T>: Plugin + InputConsumer {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        Ok(())
    }

    fn write_stream(&mut self, data: Data<T>, session: &Session) -> Result<(), ProcessingError>;

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        Ok(())
    }
}

/// Sink that needs all data at once. Selecting one switches the pipeline
/// to batch mode.
pub trait BatchWriter<T>: Plugin + InputConsumer {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        Ok(())
    }

    fn write_batch(&mut self, data: Vec<T>, session: &Session) -> Result<(), ProcessingError>;

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        Ok(())
    }
}

pub enum WriterStage<T> {
    Stream(Box<dyn StreamWriter<T>>),
    Batch(Box<dyn BatchWriter<T>>),
}

macro_rules! with_writer {
    ($stage:expr, $w:ident => $body:expr) => {
        match $stage {
            WriterStage::Stream($w) => $body,
            WriterStage::Batch($w) => $body,
        }
    };
}

impl<T> WriterStage<T> {
    pub fn stream<W: StreamWriter<T> + 'static>(writer: W) -> Self {
        WriterStage::Stream(Box::new(writer))
    }

    pub fn batch<W: BatchWriter<T> + 'static>(writer: W) -> Self {
        WriterStage::Batch(Box::new(writer))
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, WriterStage::Batch(_))
    }

    pub fn initialize(&mut self, session: &Session) -> Result<(), ProcessingError> {
        with_writer!(self, w => w.initialize(session))
    }

    /// Hands `data` to the writer in the shape it expects.
    pub fn write(&mut self, data: Data<T>, session: &Session) -> Result<(), ProcessingError> {
        match self {
            WriterStage::Stream(w) => w.write_stream(data, session),
            WriterStage::Batch(w) => w.write_batch(data.into_vec(), session),
        }
    }

    pub fn finalize(&mut self, session: &Session) -> Result<(), ProcessingError> {
        with_writer!(self, w => w.finalize(session))
    }
}

impl<T> Plugin for WriterStage<T> {
    fn name(&self) -> &str {
        with_writer!(self, w => w.name())
    }

    fn description(&self) -> &str {
        with_writer!(self, w => w.description())
    }

    fn aliases(&self) -> &[&'static str] {
        with_writer!(self, w => w.aliases())
    }

    fn options(&self) -> Vec<OptionDef> {
        with_writer!(self, w => w.options())
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        with_writer!(self, w => w.apply_option(option))
    }

    fn configure(&mut self, args: &[String]) -> Result<Vec<String>, ConfigurationError> {
        with_writer!(self, w => w.configure(args))
    }

    fn is_skipped(&self) -> bool {
        with_writer!(self, w => w.is_skipped())
    }

    fn as_input_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }
}

impl<T> InputConsumer for WriterStage<T> {
    fn accepts(&self) -> Vec<TypeTag> {
        with_writer!(self, w => w.accepts())
    }
}
