use crate::error::ProcessingError;
use crate::pipeline::data::Data;
use crate::pipeline::filter::{FilterStage, StreamBuffer, StreamFilter};
use crate::pipeline::iterator::FilterPipelineIterator;
use crate::pipeline::session::Session;
use crate::plugin::{InputConsumer, OutputProducer, Plugin, TypeTag};

/// Runs a fixed chain of filters as a single streaming filter.
///
/// Each input is pushed through the whole inner chain, and every output is
/// buffered. Accepted types come from the first inner filter, generated
/// types from the last.
pub struct MultiFilter<T> {
    filters: Vec<FilterStage<T>>,
    buffer: StreamBuffer<T>,
}

impl<T> MultiFilter<T> {
    pub fn new(filters: Vec<FilterStage<T>>) -> Self {
        Self {
            filters,
            buffer: StreamBuffer::default(),
        }
    }

    pub fn filters(&self) -> &[FilterStage<T>] {
        &self.filters
    }
}

impl<T> Plugin for MultiFilter<T> {
    fn name(&self) -> &str {
        "multi-filter"
    }

    fn description(&self) -> &str {
        "Combines multiple filters into one."
    }

    fn as_input_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }

    fn as_output_producer(&self) -> Option<&dyn OutputProducer> {
        Some(self)
    }
}

impl<T> InputConsumer for MultiFilter<T> {
    fn accepts(&self) -> Vec<TypeTag> {
        self.filters.first().map(|f| f.accepts()).unwrap_or_default()
    }
}

impl<T> OutputProducer for MultiFilter<T> {
    fn generates(&self) -> Vec<TypeTag> {
        self.filters.last().map(|f| f.generates()).unwrap_or_default()
    }
}

impl<T> StreamFilter<T> for MultiFilter<T> {
    fn buffer(&self) -> &StreamBuffer<T> {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut StreamBuffer<T> {
        &mut self.buffer
    }

    fn initialize(&mut self, session: &Session) -> Result<(), ProcessingError> {
        for filter in &mut self.filters {
            filter
                .initialize(session)
                .map_err(|e| ProcessingError::Initialization {
                    role: "filter",
                    name: filter.name().to_string(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }

    fn do_process_stream(&mut self, data: Data<T>, session: &Session) -> Result<(), ProcessingError> {
        let outputs = FilterPipelineIterator::new(data, &mut self.filters, session);
        for output in outputs {
            self.buffer.push(output?);
        }
        Ok(())
    }

    /// Finalizes every inner filter, reporting the first failure.
    fn finalize(&mut self, session: &Session) -> Result<(), ProcessingError> {
        let mut first_error = None;
        for filter in &mut self.filters {
            if let Err(e) = filter.finalize(session) {
                tracing::warn!(filter = %filter.name(), error = %e, "Failed to finalize filter");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
