//! Pipeline runtime: stages, data flow and execution.
//!
//! reader → filter* → writer, either item by item (stream mode) or with all
//! data collected first (batch mode).

pub mod data;
pub mod executor;
pub mod filter;
pub mod iterator;
pub mod multi;
pub mod placeholders;
pub mod reader;
pub mod session;
pub mod split;
pub mod stage;
pub mod writer;

pub use data::Data;
pub use executor::{
    execute, ExecutionMode, ExecutionSummary, ExecutorState, Pipeline, PipelineExecutor,
};
pub use filter::{BatchFilter, FilterStage, StreamBuffer, StreamFilter};
pub use iterator::{filter_data, FilterPipelineIterator};
pub use multi::MultiFilter;
pub use placeholders::{expand_placeholders, placeholder_help};
pub use reader::Reader;
pub use session::{ExecutionOptions, InputTracker, Session, StopHandle};
pub use split::{gcd, SplitSettings, Splitter};
pub use stage::{
    Stage, BATCH_WRITER_BASE, FILTER_BASE, READER_BASE, STREAM_FILTER_BASE, STREAM_WRITER_BASE,
    WRITER_BASE,
};
pub use writer::{BatchWriter, StreamWriter, WriterStage};
