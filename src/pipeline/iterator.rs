//! Lazy propagation of one input through a chain of filters.

use crate::error::ProcessingError;
use crate::pipeline::data::Data;
use crate::pipeline::filter::FilterStage;
use crate::pipeline::session::Session;

/// Pulls the outputs of a filter chain for a single input, one at a time.
///
/// Streaming filters may hold several pending outputs. Each pull resumes
/// from the deepest filter that still has pending output, so every pending
/// output of a filter is pushed through the rest of the chain before the
/// filter ahead of it is asked again. Output order matches a depth-first
/// expansion of the input.
///
/// A chain without filters yields the input once. A stop request, an error
/// or an exhausted chain end iteration.
pub struct FilterPipelineIterator<'a, T> {
    data: Option<Data<T>>,
    filters: &'a mut [FilterStage<T>],
    session: &'a Session,
    /// Indices of streaming filters with pending output, ascending.
    pending: Vec<usize>,
    first: bool,
    finished: bool,
}

impl<'a, T> FilterPipelineIterator<'a, T> {
    pub fn new(data: Data<T>, filters: &'a mut [FilterStage<T>], session: &'a Session) -> Self {
        Self {
            data: Some(data),
            filters,
            session,
            pending: Vec::new(),
            first: true,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Next output, or `None` once the chain is exhausted.
    pub fn try_next(&mut self) -> Result<Option<Data<T>>, ProcessingError> {
        let result = self.pull();
        if result.is_err() {
            self.finished = true;
        }
        result
    }

    fn pull(&mut self) -> Result<Option<Data<T>>, ProcessingError> {
        if self.finished {
            return Ok(None);
        }

        if self.filters.is_empty() {
            self.finished = true;
            return Ok(if self.first {
                self.first = false;
                self.data.take()
            } else {
                None
            });
        }

        let last = self.filters.len() - 1;

        while !self.finished {
            if self.session.is_stopped() {
                self.finished = true;
                break;
            }

            let start = self.pending.last().copied().unwrap_or(0);
            let mut output = if self.first {
                self.first = false;
                self.data.take()
            } else {
                None
            };

            for index in start..=last {
                if self.session.is_stopped() {
                    self.finished = true;
                    return Ok(None);
                }

                match output.take() {
                    None => {
                        // Resuming: drain the next pending output of this filter.
                        if let FilterStage::Stream(filter) = &mut self.filters[index] {
                            if filter.has_output() {
                                self.pending.pop();
                                output = filter.output();
                                if filter.has_output() {
                                    self.pending.push(index);
                                }
                                if index == last && output.is_some() {
                                    return Ok(output);
                                }
                                continue;
                            }
                        }
                    }
                    Some(data) => match &mut self.filters[index] {
                        FilterStage::Stream(filter) => {
                            filter.process_stream(data, self.session)?;
                            output = filter.output();
                            if filter.has_output() {
                                self.pending.push(index);
                            }
                        }
                        FilterStage::Batch(filter) => {
                            output = filter.process(data, self.session)?;
                        }
                    },
                }

                if output.is_none() {
                    break;
                }
                if index == last {
                    return Ok(output);
                }
            }

            self.finished = self.pending.is_empty();
        }

        Ok(None)
    }
}

impl<T> Iterator for FilterPipelineIterator<'_, T> {
    type Item = Result<Data<T>, ProcessingError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().transpose()
    }
}

/// Lazily runs `data` through `filters`.
pub fn filter_data<'a, T>(
    data: Data<T>,
    filters: &'a mut [FilterStage<T>],
    session: &'a Session,
) -> FilterPipelineIterator<'a, T> {
    FilterPipelineIterator::new(data, filters, session)
}
