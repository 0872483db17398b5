//! Command-line assembly: resolve names, split into groups, instantiate.
//!
//! Pipeline: raw args → split_args() → ArgGroups → instantiate() → plugins

pub mod instantiator;
pub mod resolver;
pub mod splitter;

pub use instantiator::{instantiate, Instantiated};
pub use resolver::NameResolver;
pub use splitter::{is_help_requested, split_args, ArgGroups, HelpRequest};
