//! Plugin and class discovery.

pub mod cache;
pub mod catalog;
pub mod class_lister;
pub mod entry_points;
pub mod plugin_registry;

pub use cache::ClassCache;
pub use catalog::{
    ClassLister, ClassLookup, Factory, InstantiationError, ListerRef, ModuleCatalog, PluginClass,
    DEFAULT_LISTER_FUNCTION,
};
pub use class_lister::{ClassListerRegistry, CLASS_LISTER_GROUP};
pub use entry_points::{generate_entry_points, EntryPoint, EntryPointSource, EntryPoints};
pub use plugin_registry::{EntryPointMode, PluginEntry, PluginMap, PluginRegistry};
