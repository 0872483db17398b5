//! Runs a reader → filters → writer chain.

use crate::error::{ConfigurationError, ProcessingError};
use crate::pipeline::data::Data;
use crate::pipeline::filter::FilterStage;
use crate::pipeline::iterator::filter_data;
use crate::pipeline::reader::Reader;
use crate::pipeline::session::{Session, StopHandle};
use crate::pipeline::stage::Stage;
use crate::pipeline::writer::WriterStage;
use crate::plugin::{plugin_usage, HelpFormat, Plugin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Stream,
    Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    SessionBound,
    Initialized,
    StreamExecuting,
    BatchExecuting,
    Finalized,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub mode: ExecutionMode,
    /// Records read from the reader.
    pub processed: u64,
    pub stopped: bool,
}

/// A reader, zero or more filters, and an optional writer.
pub struct Pipeline<T> {
    pub reader: Box<dyn Reader<T>>,
    pub filters: Vec<FilterStage<T>>,
    pub writer: Option<WriterStage<T>>,
}

impl<T> Pipeline<T> {
    pub fn new<R: Reader<T> + 'static>(reader: R) -> Self {
        Self {
            reader: Box::new(reader),
            filters: Vec::new(),
            writer: None,
        }
    }

    pub fn with_filter(mut self, filter: FilterStage<T>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_writer(mut self, writer: WriterStage<T>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Builds a pipeline from command-line stages: a reader first, then
    /// filters, then at most one writer at the end.
    pub fn from_stages(stages: Vec<Stage<T>>) -> Result<Self, ConfigurationError> {
        let mut stages = stages.into_iter();
        let reader = match stages.next() {
            Some(Stage::Reader(reader)) => reader,
            Some(other) => {
                return Err(ConfigurationError::Invalid(format!(
                    "Pipeline must start with a reader, found {} '{}'",
                    other.role(),
                    other.name()
                )))
            }
            None => return Err(ConfigurationError::Invalid("No reader specified".to_string())),
        };

        let mut pipeline = Self {
            reader,
            filters: Vec::new(),
            writer: None,
        };
        for stage in stages {
            if let Some(writer) = &pipeline.writer {
                return Err(ConfigurationError::Invalid(format!(
                    "Writer '{}' must be the last plugin, found '{}' after it",
                    writer.name(),
                    stage.name()
                )));
            }
            match stage {
                Stage::Filter(filter) => pipeline.filters.push(filter),
                Stage::Writer(writer) => pipeline.writer = Some(writer),
                Stage::Reader(reader) => {
                    return Err(ConfigurationError::Invalid(format!(
                        "Only one reader allowed, found another: '{}'",
                        reader.name()
                    )))
                }
            }
        }
        Ok(pipeline)
    }

    /// Batch mode is used when forced or when the writer needs all data at
    /// once, unless the reader never finishes.
    pub fn select_mode(&self, force_batch: bool) -> ExecutionMode {
        let wants_batch = force_batch || self.writer.as_ref().is_some_and(WriterStage::is_batch);
        if wants_batch && self.reader.is_infinite() {
            tracing::warn!(
                reader = %self.reader.name(),
                "Reader produces data infinitely, disabling batch mode"
            );
            return ExecutionMode::Stream;
        }
        if wants_batch {
            ExecutionMode::Batch
        } else {
            ExecutionMode::Stream
        }
    }
}

/// How many stages were successfully initialized, so only those are finalized.
#[derive(Debug, Default)]
struct InitProgress {
    reader: bool,
    filters: usize,
    writer: bool,
}

type SessionHook = Box<dyn FnOnce(&Session)>;

pub struct PipelineExecutor<T> {
    pipeline: Pipeline<T>,
    session: Option<Session>,
    state: ExecutorState,
    progress: InitProgress,
    pre_initialize: Option<SessionHook>,
    post_finalize: Option<SessionHook>,
}

impl<T> PipelineExecutor<T> {
    pub fn new(pipeline: Pipeline<T>) -> Self {
        Self {
            pipeline,
            session: None,
            state: ExecutorState::Idle,
            progress: InitProgress::default(),
            pre_initialize: None,
            post_finalize: None,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self.state = ExecutorState::SessionBound;
        self
    }

    /// Runs after the session is bound, before any stage is initialized.
    pub fn with_pre_initialize(mut self, hook: impl FnOnce(&Session) + 'static) -> Self {
        self.pre_initialize = Some(Box::new(hook));
        self
    }

    /// Runs after every stage has been finalized, even when the run failed.
    pub fn with_post_finalize(mut self, hook: impl FnOnce(&Session) + 'static) -> Self {
        self.post_finalize = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn stop_handle(&self) -> Option<StopHandle> {
        self.session.as_ref().map(Session::stop_handle)
    }

    pub fn into_pipeline(self) -> Pipeline<T> {
        self.pipeline
    }

    /// Initializes every stage, runs the data through and finalizes.
    ///
    /// Stages that were initialized are always finalized, also after a
    /// failure. A stop request ends the run early without an error.
    pub fn execute(&mut self) -> Result<ExecutionSummary, ProcessingError> {
        if self.state == ExecutorState::Finalized {
            return Err(ProcessingError::stage("executor", "pipeline has already been executed"));
        }

        let Self {
            pipeline,
            session,
            state,
            progress,
            pre_initialize,
            post_finalize,
        } = self;
        let session: &Session = session.get_or_insert_with(Session::default);
        *state = ExecutorState::SessionBound;
        let _entered = session.span().clone().entered();

        if let Some(hook) = pre_initialize.take() {
            hook(session);
        }

        let result = match initialize_stages(pipeline, session, progress) {
            Ok(()) => {
                *state = ExecutorState::Initialized;
                let mode = pipeline.select_mode(session.options().force_batch);
                tracing::debug!(?mode, "Starting execution");
                let run = match mode {
                    ExecutionMode::Stream => {
                        *state = ExecutorState::StreamExecuting;
                        stream_execution(pipeline, session)
                    }
                    ExecutionMode::Batch => {
                        *state = ExecutorState::BatchExecuting;
                        batch_execution(pipeline, session)
                    }
                };
                match &run {
                    Ok(()) if session.is_stopped() => {
                        tracing::info!(processed = session.count(), "Execution stopped")
                    }
                    Ok(()) => tracing::info!(processed = session.count(), "Execution finished"),
                    Err(e) => tracing::error!(error = %e, details = ?e, "Execution failed"),
                }
                run.map(|()| ExecutionSummary {
                    mode,
                    processed: session.count(),
                    stopped: session.is_stopped(),
                })
            }
            Err(e) => Err(e),
        };

        finalize_stages(pipeline, session, progress);
        *state = ExecutorState::Finalized;

        if let Some(hook) = post_finalize.take() {
            hook(session);
        }

        result
    }
}

/// Convenience wrapper: run `pipeline` once with `session`.
pub fn execute<T>(pipeline: Pipeline<T>, session: Session) -> Result<ExecutionSummary, ProcessingError> {
    PipelineExecutor::new(pipeline).with_session(session).execute()
}

fn init_failure<P: Plugin + ?Sized>(role: &'static str, plugin: &P, error: ProcessingError) -> ProcessingError {
    tracing::error!(
        role,
        plugin = %plugin.name(),
        error = %error,
        "Failed to initialize\n{}",
        plugin_usage(plugin, HelpFormat::Text, 1)
    );
    ProcessingError::Initialization {
        role,
        name: plugin.name().to_string(),
        source: Box::new(error),
    }
}

fn initialize_stages<T>(
    pipeline: &mut Pipeline<T>,
    session: &Session,
    progress: &mut InitProgress,
) -> Result<(), ProcessingError> {
    pipeline
        .reader
        .initialize(session)
        .map_err(|e| init_failure("reader", &*pipeline.reader, e))?;
    progress.reader = true;

    for filter in &mut pipeline.filters {
        filter
            .initialize(session)
            .map_err(|e| init_failure("filter", &*filter, e))?;
        progress.filters += 1;
    }

    if let Some(writer) = &mut pipeline.writer {
        writer
            .initialize(session)
            .map_err(|e| init_failure("writer", &*writer, e))?;
        progress.writer = true;
    }
    Ok(())
}

fn finalize_stages<T>(pipeline: &mut Pipeline<T>, session: &Session, progress: &InitProgress) {
    if progress.reader {
        if let Err(e) = pipeline.reader.finalize(session) {
            tracing::warn!(reader = %pipeline.reader.name(), error = %e, "Failed to finalize reader");
        }
    }
    for filter in pipeline.filters.iter_mut().take(progress.filters) {
        if let Err(e) = filter.finalize(session) {
            tracing::warn!(filter = %filter.name(), error = %e, "Failed to finalize filter");
        }
    }
    if progress.writer {
        if let Some(writer) = &mut pipeline.writer {
            if let Err(e) = writer.finalize(session) {
                tracing::warn!(writer = %writer.name(), error = %e, "Failed to finalize writer");
            }
        }
    }
}

fn log_progress(count: u64, interval: u64, what: &str) {
    if count % interval == 0 {
        tracing::info!(count, "{} {} records", what, count);
    }
}

fn stream_execution<T>(pipeline: &mut Pipeline<T>, session: &Session) -> Result<(), ProcessingError> {
    let interval = session.options().update_interval.max(1);

    loop {
        while let Some(item) = pipeline.reader.read(session)? {
            if session.is_stopped() {
                return Ok(());
            }
            let count = session.increment();

            for output in filter_data(Data::Item(item), &mut pipeline.filters, session) {
                let output = output?;
                if session.is_stopped() {
                    return Ok(());
                }
                if let Some(writer) = &mut pipeline.writer {
                    writer.write(output, session)?;
                }
            }

            log_progress(count, interval, "Processed");
        }

        if session.is_stopped() || pipeline.reader.has_finished() {
            return Ok(());
        }
    }
}

fn batch_execution<T>(pipeline: &mut Pipeline<T>, session: &Session) -> Result<(), ProcessingError> {
    let interval = session.options().update_interval.max(1);

    let mut data = Vec::new();
    loop {
        while let Some(item) = pipeline.reader.read(session)? {
            if session.is_stopped() {
                return Ok(());
            }
            let count = session.increment();
            data.push(item);
            log_progress(count, interval, "Read");
        }
        if session.is_stopped() {
            return Ok(());
        }
        if pipeline.reader.has_finished() {
            break;
        }
    }

    let data = if pipeline.filters.is_empty() {
        data
    } else {
        let mut filtered = Vec::new();
        for output in filter_data(Data::Batch(data), &mut pipeline.filters, session) {
            filtered.extend(output?.into_vec());
            if session.is_stopped() {
                return Ok(());
            }
        }
        tracing::info!(count = filtered.len(), "Filtered records");
        filtered
    };

    match &mut pipeline.writer {
        Some(WriterStage::Batch(writer)) => writer.write_batch(data, session)?,
        Some(WriterStage::Stream(writer)) => {
            for (index, item) in data.into_iter().enumerate() {
                if session.is_stopped() {
                    return Ok(());
                }
                writer.write_stream(Data::Item(item), session)?;
                log_progress(index as u64 + 1, interval, "Wrote");
            }
        }
        None => {}
    }
    Ok(())
}
