use crate::error::ProcessingError;
use crate::pipeline::session::Session;
use crate::plugin::{OutputProducer, Plugin};

/// Source of a pipeline.
///
/// Data is pulled in passes: `read` is called until it returns `None`, then
/// the executor asks `has_finished`. A reader that is not finished gets
/// another pass.
pub trait Reader<T>: Plugin + OutputProducer {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        Ok(())
    }

    /// Next item of the current pass, `None` when the pass is exhausted.
    fn read(&mut self, session: &Session) -> Result<Option<T>, ProcessingError>;

    fn has_finished(&self) -> bool;

    /// Readers that never finish disable batch mode.
    fn is_infinite(&self) -> bool {
        false
    }

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        Ok(())
    }
}
