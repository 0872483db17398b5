//! Per-run context shared by every stage of a pipeline.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Options a run is configured with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Progress is logged every N records.
    pub update_interval: u64,
    /// Prefer batch mode even for stream writers.
    pub force_batch: bool,
    pub logging_level: String,
    /// Free-form options for plugins that need run-wide settings.
    pub extra: BTreeMap<String, String>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            update_interval: 1000,
            force_batch: false,
            logging_level: "WARN".to_string(),
            extra: BTreeMap::new(),
        }
    }
}

/// Cloneable handle that requests a run to stop.
///
/// Safe to trigger from a signal handler thread; stages observe the flag at
/// their next check.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// The underlying flag, e.g. for `signal_hook::flag::register`.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stopped)
    }
}

#[derive(Debug)]
pub struct Session {
    options: ExecutionOptions,
    count: AtomicU64,
    current_input: RwLock<Option<String>>,
    stop: StopHandle,
    span: tracing::Span,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ExecutionOptions::default())
    }
}

impl Session {
    pub fn new(options: ExecutionOptions) -> Self {
        Self {
            options,
            count: AtomicU64::new(0),
            current_input: RwLock::new(None),
            stop: StopHandle::default(),
            span: tracing::info_span!("pipeline"),
        }
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Records read so far.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub(crate) fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Path or name of the input currently being read, set by readers.
    pub fn current_input(&self) -> Option<String> {
        self.current_input.read().clone()
    }

    pub fn set_current_input(&self, input: Option<String>) {
        *self.current_input.write() = input;
    }

    pub fn stop(&self) {
        if !self.stop.is_stopped() {
            tracing::info!("Stop requested");
        }
        self.stop.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }
}

/// Remembers the last input seen, so stages can react to input changes
/// (e.g. start a new output file).
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    last_input: Option<String>,
}

impl InputTracker {
    /// Compares `current` (or the session's current input when `None`)
    /// against the last input seen, optionally remembering it.
    pub fn has_input_changed(&mut self, session: &Session, current: Option<&str>, update: bool) -> bool {
        let current = current.map(str::to_string).or_else(|| session.current_input());
        let changed = self.last_input != current;
        if update {
            self.last_input = current;
        }
        changed
    }

    pub fn update_last_input(&mut self, current: Option<String>) {
        self.last_input = current;
    }

    pub fn last_input(&self) -> Option<&str> {
        self.last_input.as_deref()
    }
}
