//! Batch and streaming filters.

use std::collections::VecDeque;

use crate::error::{ConfigurationError, ProcessingError};
use crate::pipeline::data::Data;
use crate::pipeline::session::Session;
use crate::plugin::{InputConsumer, OptionDef, OutputProducer, ParsedOption, Plugin, TypeTag};

/// A filter producing at most one output per input.
pub trait BatchFilter<T>: Plugin + InputConsumer + OutputProducer {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        Ok(())
    }

    /// Whether `do_process` wants every input as a batch.
    fn requires_list_input(&self) -> bool {
        false
    }

    /// Processes one unit. `None` drops it.
    fn do_process(&mut self, data: Data<T>, session: &Session) -> Result<Option<Data<T>>, ProcessingError>;

    /// Adapts the input shape to `requires_list_input` before calling
    /// `do_process`: batches are processed item by item unless the filter
    /// wants lists, and single items are wrapped when it does.
    fn process(&mut self, data: Data<T>, session: &Session) -> Result<Option<Data<T>>, ProcessingError> {
        match data {
            Data::Batch(items) if !self.requires_list_input() => {
                let mut result = Vec::new();
                for item in items {
                    if let Some(output) = self.do_process(Data::Item(item), session)? {
                        result.extend(output.into_vec());
                    }
                }
                Ok(Data::from_vec(result))
            }
            Data::Item(item) if self.requires_list_input() => {
                self.do_process(Data::Batch(vec![item]), session)
            }
            data => self.do_process(data, session),
        }
    }

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        Ok(())
    }
}

/// Pending output of a streaming filter, drained in FIFO order.
#[derive(Debug)]
pub struct StreamBuffer<T> {
    pending: VecDeque<Data<T>>,
}

impl<T> Default for StreamBuffer<T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }
}

impl<T> StreamBuffer<T> {
    pub fn push(&mut self, data: Data<T>) {
        self.pending.push_back(data);
    }

    pub fn push_item(&mut self, item: T) {
        self.push(Data::Item(item));
    }

    pub fn pop(&mut self) -> Option<Data<T>> {
        self.pending.pop_front()
    }

    pub fn has_output(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// A filter that may produce any number of outputs per input, or keep
/// state and emit later.
///
/// Outputs are buffered and drained one at a time by the pipeline.
pub trait StreamFilter<T>: Plugin + InputConsumer + OutputProducer {
    fn buffer(&self) -> &StreamBuffer<T>;

    fn buffer_mut(&mut self) -> &mut StreamBuffer<T>;

    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        Ok(())
    }

    /// Processes one unit, pushing any outputs onto the buffer.
    fn do_process_stream(&mut self, data: Data<T>, session: &Session) -> Result<(), ProcessingError>;

    /// Replaces pending output with the outputs for `data`.
    fn process_stream(&mut self, data: Data<T>, session: &Session) -> Result<(), ProcessingError> {
        self.buffer_mut().clear();
        self.do_process_stream(data, session)
    }

    fn has_output(&self) -> bool {
        self.buffer().has_output()
    }

    /// Next pending output, if any.
    fn output(&mut self) -> Option<Data<T>> {
        self.buffer_mut().pop()
    }

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        Ok(())
    }
}

/// Applies `$body` to whichever filter a [`FilterStage`] holds.
macro_rules! with_filter {
    ($stage:expr, $f:ident => $body:expr) => {
        match $stage {
            FilterStage::Batch($f) => $body,
            FilterStage::Stream($f) => $body,
        }
    };
}

/// Either kind of filter, as stored in a pipeline.
pub enum FilterStage<T> {
    Batch(Box<dyn BatchFilter<T>>),
    Stream(Box<dyn StreamFilter<T>>),
}

impl<T> FilterStage<T> {
    pub fn batch<F: BatchFilter<T> + 'static>(filter: F) -> Self {
        FilterStage::Batch(Box::new(filter))
    }

    pub fn stream<F: StreamFilter<T> + 'static>(filter: F) -> Self {
        FilterStage::Stream(Box::new(filter))
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, FilterStage::Stream(_))
    }

    /// Initializes the filter; a streaming filter starts with no pending output.
    pub fn initialize(&mut self, session: &Session) -> Result<(), ProcessingError> {
        match self {
            FilterStage::Batch(f) => f.initialize(session),
            FilterStage::Stream(f) => {
                f.buffer_mut().clear();
                f.initialize(session)
            }
        }
    }

    pub fn finalize(&mut self, session: &Session) -> Result<(), ProcessingError> {
        with_filter!(self, f => f.finalize(session))
    }
}

impl<T> Plugin for FilterStage<T> {
    fn name(&self) -> &str {
        with_filter!(self, f => f.name())
    }

    fn description(&self) -> &str {
        with_filter!(self, f => f.description())
    }

    fn aliases(&self) -> &[&'static str] {
        with_filter!(self, f => f.aliases())
    }

    fn options(&self) -> Vec<OptionDef> {
        with_filter!(self, f => f.options())
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        with_filter!(self, f => f.apply_option(option))
    }

    fn configure(&mut self, args: &[String]) -> Result<Vec<String>, ConfigurationError> {
        with_filter!(self, f => f.configure(args))
    }

    fn is_skipped(&self) -> bool {
        with_filter!(self, f => f.is_skipped())
    }

    fn as_input_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }

    fn as_output_producer(&self) -> Option<&dyn OutputProducer> {
        Some(self)
    }
}

impl<T> InputConsumer for FilterStage<T> {
    fn accepts(&self) -> Vec<TypeTag> {
        with_filter!(self, f => f.accepts())
    }
}

impl<T> OutputProducer for FilterStage<T> {
    fn generates(&self) -> Vec<TypeTag> {
        with_filter!(self, f => f.generates())
    }
}
