//! Shared test plugins and helpers.

#![allow(dead_code, unused_imports)]

use parking_lot::Mutex;
use std::sync::Arc;

use stagehand::error::{ConfigurationError, ProcessingError};
use stagehand::pipeline::{
    BatchFilter, BatchWriter, Data, Reader, Session, StreamBuffer, StreamFilter, StreamWriter,
};
use stagehand::plugin::{
    InputConsumer, OptionDef, OutputProducer, ParsedOption, Plugin, TypeTag, ANY, SKIP_OPTION,
};

/// Lifecycle events and written items, shared between a test and its plugins.
pub type SpyLog = Arc<Mutex<Vec<String>>>;

pub fn spy() -> SpyLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn strings(list: &[&str]) -> Vec<String> {
    args(list)
}

// =============================================================================
// READERS
// =============================================================================

/// Yields fixed items, split into passes.
pub struct VecReader {
    passes: Vec<Vec<String>>,
    pass: usize,
    pos: usize,
    infinite: bool,
    log: SpyLog,
    fail_init: bool,
}

impl VecReader {
    pub fn new(items: &[&str], log: &SpyLog) -> Self {
        Self::with_passes(&[items], log)
    }

    pub fn with_passes(passes: &[&[&str]], log: &SpyLog) -> Self {
        Self {
            passes: passes.iter().map(|p| strings(p)).collect(),
            pass: 0,
            pos: 0,
            infinite: false,
            log: Arc::clone(log),
            fail_init: false,
        }
    }

    /// Claims to be infinite while still returning its items.
    pub fn infinite(mut self) -> Self {
        self.infinite = true;
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }
}

impl Plugin for VecReader {
    fn name(&self) -> &str {
        "vec-reader"
    }

    fn description(&self) -> &str {
        "Reads items from memory."
    }
}

impl OutputProducer for VecReader {
    fn generates(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl Reader<String> for VecReader {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.log.lock().push("init vec-reader".into());
        if self.fail_init {
            return Err(ProcessingError::stage("vec-reader", "cannot open"));
        }
        Ok(())
    }

    fn read(&mut self, _session: &Session) -> Result<Option<String>, ProcessingError> {
        let Some(pass) = self.passes.get(self.pass) else {
            return Ok(None);
        };
        if let Some(item) = pass.get(self.pos) {
            self.pos += 1;
            return Ok(Some(item.clone()));
        }
        self.pass += 1;
        self.pos = 0;
        Ok(None)
    }

    fn has_finished(&self) -> bool {
        self.pass >= self.passes.len()
    }

    fn is_infinite(&self) -> bool {
        self.infinite
    }

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.log.lock().push("finalize vec-reader".into());
        Ok(())
    }
}

// =============================================================================
// FILTERS
// =============================================================================

/// Appends a suffix; drops items equal to `drop`. Fails on `fail_on`.
pub struct Suffix {
    name: &'static str,
    suffix: String,
    drop: Option<String>,
    fail_on: Option<String>,
    list_input: bool,
    skip: bool,
    log: SpyLog,
}

impl Suffix {
    pub fn new(name: &'static str, suffix: &str, log: &SpyLog) -> Self {
        Self {
            name,
            suffix: suffix.to_string(),
            drop: None,
            fail_on: None,
            list_input: false,
            skip: false,
            log: Arc::clone(log),
        }
    }

    pub fn dropping(mut self, item: &str) -> Self {
        self.drop = Some(item.to_string());
        self
    }

    pub fn failing_on(mut self, item: &str) -> Self {
        self.fail_on = Some(item.to_string());
        self
    }

    pub fn with_list_input(mut self) -> Self {
        self.list_input = true;
        self
    }
}

impl Plugin for Suffix {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Appends a suffix."
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
}

impl InputConsumer for Suffix {
    fn accepts(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl OutputProducer for Suffix {
    fn generates(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl BatchFilter<String> for Suffix {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.log.lock().push(format!("init {}", self.name));
        Ok(())
    }

    fn requires_list_input(&self) -> bool {
        self.list_input
    }

    fn do_process(&mut self, data: Data<String>, _session: &Session) -> Result<Option<Data<String>>, ProcessingError> {
        if self.list_input {
            self.log.lock().push(format!("{} got {}", self.name, data.len()));
        }
        let mut result = Vec::new();
        for item in data.into_vec() {
            if self.fail_on.as_deref() == Some(item.as_str()) {
                return Err(ProcessingError::stage(self.name, format!("cannot process {}", item)));
            }
            if self.drop.as_deref() == Some(item.as_str()) {
                continue;
            }
            result.push(format!("{}{}", item, self.suffix));
        }
        Ok(Data::from_vec(result))
    }

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.log.lock().push(format!("finalize {}", self.name));
        Ok(())
    }
}

/// Streaming filter emitting `item1 .. itemN` for every input item.
pub struct Expand {
    name: &'static str,
    copies: usize,
    buffer: StreamBuffer<String>,
    log: SpyLog,
}

impl Expand {
    pub fn new(name: &'static str, copies: usize, log: &SpyLog) -> Self {
        Self {
            name,
            copies,
            buffer: StreamBuffer::default(),
            log: Arc::clone(log),
        }
    }
}

impl Plugin for Expand {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Emits numbered copies."
    }
}

impl InputConsumer for Expand {
    fn accepts(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl OutputProducer for Expand {
    fn generates(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl StreamFilter<String> for Expand {
    fn buffer(&self) -> &StreamBuffer<String> {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut StreamBuffer<String> {
        &mut self.buffer
    }

    fn do_process_stream(&mut self, data: Data<String>, _session: &Session) -> Result<(), ProcessingError> {
        for item in data.into_vec() {
            for copy in 1..=self.copies {
                self.buffer.push_item(format!("{}{}", item, copy));
            }
        }
        Ok(())
    }

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.log.lock().push(format!("finalize {}", self.name));
        Ok(())
    }
}

// =============================================================================
// WRITERS
// =============================================================================

/// Records what it is given. Usable as stream or batch writer.
pub struct Collector {
    log: SpyLog,
    written: SpyLog,
    batches: Arc<Mutex<Vec<usize>>>,
}

impl Collector {
    pub fn new(log: &SpyLog, written: &SpyLog) -> Self {
        Self {
            log: Arc::clone(log),
            written: Arc::clone(written),
            batches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sizes of the batches received through `write_batch`.
    pub fn batches(&self) -> Arc<Mutex<Vec<usize>>> {
        Arc::clone(&self.batches)
    }
}

impl Plugin for Collector {
    fn name(&self) -> &str {
        "collector"
    }

    fn description(&self) -> &str {
        "Collects items."
    }
}

impl InputConsumer for Collector {
    fn accepts(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl StreamWriter<String> for Collector {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.log.lock().push("init collector".into());
        Ok(())
    }

    fn write_stream(&mut self, data: Data<String>, _session: &Session) -> Result<(), ProcessingError> {
        self.written.lock().extend(data.into_vec());
        Ok(())
    }

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.log.lock().push("finalize collector".into());
        Ok(())
    }
}

impl BatchWriter<String> for Collector {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.log.lock().push("init collector".into());
        Ok(())
    }

    fn write_batch(&mut self, data: Vec<String>, _session: &Session) -> Result<(), ProcessingError> {
        self.batches.lock().push(data.len());
        self.written.lock().extend(data);
        Ok(())
    }

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.log.lock().push("finalize collector".into());
        Ok(())
    }
}

// =============================================================================
// DISCOVERY
// =============================================================================

/// Minimal plugin for registry tests; understands `--value V` and `--skip`.
#[derive(Debug, Clone, Default)]
pub struct Named {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub value: Option<String>,
    pub skip: bool,
}

impl Named {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }
}

impl Plugin for Named {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Does nothing."
    }

    fn aliases(&self) -> &[&'static str] {
        self.aliases
    }

    fn options(&self) -> Vec<OptionDef> {
        vec![OptionDef::skip(), OptionDef::value("--value", "A value")]
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        if option.is(SKIP_OPTION) {
            self.skip = true;
        } else if option.is("--value") {
            self.value = Some(option.require_value()?.to_string());
        }
        Ok(())
    }

    fn is_skipped(&self) -> bool {
        self.skip
    }
}
