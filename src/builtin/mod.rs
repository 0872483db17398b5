//! Plugins shipped with the binary, and the discovery wiring for them.
//!
//! The built-in modules are registered in a [`ModuleCatalog`] so they are
//! found the same way third-party plugins would be: through entry points,
//! module scanning or class listers.

pub mod filters;
pub mod readers;
pub mod writers;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{Config, ENV_CLASS_LISTERS};
use crate::error::PipelineError;
use crate::pipeline::{
    FilterStage, Stage, WriterStage, BATCH_WRITER_BASE, FILTER_BASE, READER_BASE,
    STREAM_FILTER_BASE, STREAM_WRITER_BASE, WRITER_BASE,
};
use crate::plugin::TypeTag;
use crate::registry::{ClassListerRegistry, ModuleCatalog, PluginClass, PluginMap, PluginRegistry};

pub use filters::{Grep, GrepAction, SplitWords, Take, Upper};
pub use readers::{FromLines, Generate};
pub use writers::{ToConsole, ToFile};

/// Name used for the cache and config directories.
pub const APP_NAME: &str = "stagehand";

pub const READERS_MODULE: &str = "stagehand.builtin.readers";
pub const FILTERS_MODULE: &str = "stagehand.builtin.filters";
pub const WRITERS_MODULE: &str = "stagehand.builtin.writers";
pub const LISTER_MODULE: &str = "stagehand.builtin";

/// Entry-point groups per plugin role.
pub const READERS_GROUP: &str = "stagehand.readers";
pub const FILTERS_GROUP: &str = "stagehand.filters";
pub const WRITERS_GROUP: &str = "stagehand.writers";

pub static TEXT: TypeTag = TypeTag::new("text");
pub static LINE: TypeTag = TypeTag::derived("line", &TEXT);
pub static WORD: TypeTag = TypeTag::derived("word", &TEXT);

type BuiltinClass = PluginClass<Stage<String>>;

pub fn default_modules() -> Vec<String> {
    [READERS_MODULE, FILTERS_MODULE, WRITERS_MODULE]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

pub fn default_class_listers() -> Vec<String> {
    vec![format!("{}:list_classes", LISTER_MODULE)]
}

/// Class lister for the built-in modules: base class → modules to scan.
pub fn list_classes() -> BTreeMap<String, Vec<String>> {
    let mut result = BTreeMap::new();
    result.insert(READER_BASE.to_string(), vec![READERS_MODULE.to_string()]);
    for base in [FILTER_BASE, STREAM_FILTER_BASE] {
        result.insert(base.to_string(), vec![FILTERS_MODULE.to_string()]);
    }
    for base in [WRITER_BASE, STREAM_WRITER_BASE, BATCH_WRITER_BASE] {
        result.insert(base.to_string(), vec![WRITERS_MODULE.to_string()]);
    }
    result
}

fn reader_classes() -> Vec<BuiltinClass> {
    vec![
        PluginClass::new(READERS_MODULE, "FromLines", &[READER_BASE], || {
            Ok(Stage::reader(FromLines::default()))
        }),
        PluginClass::new(READERS_MODULE, "Generate", &[READER_BASE], || {
            Ok(Stage::reader(Generate::default()))
        }),
    ]
}

fn filter_classes() -> Vec<BuiltinClass> {
    vec![
        PluginClass::new(FILTERS_MODULE, "Upper", &[FILTER_BASE], || {
            Ok(FilterStage::batch(Upper::default()).into())
        }),
        PluginClass::new(FILTERS_MODULE, "Grep", &[FILTER_BASE], || {
            Ok(FilterStage::batch(Grep::default()).into())
        }),
        PluginClass::new(FILTERS_MODULE, "Take", &[FILTER_BASE], || {
            Ok(FilterStage::batch(Take::default()).into())
        }),
        PluginClass::new(FILTERS_MODULE, "SplitWords", &[STREAM_FILTER_BASE, FILTER_BASE], || {
            Ok(FilterStage::stream(SplitWords::default()).into())
        }),
    ]
}

fn writer_classes() -> Vec<BuiltinClass> {
    vec![
        PluginClass::new(WRITERS_MODULE, "ToConsole", &[STREAM_WRITER_BASE, WRITER_BASE], || {
            Ok(WriterStage::stream(ToConsole::default()).into())
        }),
        PluginClass::new(WRITERS_MODULE, "ToFile", &[BATCH_WRITER_BASE, WRITER_BASE], || {
            Ok(WriterStage::batch(ToFile::default()).into())
        }),
    ]
}

/// Catalog of every built-in module and the built-in class lister.
pub fn catalog() -> ModuleCatalog<Stage<String>> {
    ModuleCatalog::new()
        .with_base(READER_BASE)
        .with_base(FILTER_BASE)
        .with_base(WRITER_BASE)
        .with_module(READERS_MODULE, reader_classes())
        .with_module(FILTERS_MODULE, filter_classes())
        .with_module(WRITERS_MODULE, writer_classes())
        .with_lister(&default_class_listers()[0], list_classes)
}

fn non_empty(list: &[String]) -> Option<Vec<String>> {
    (!list.is_empty()).then(|| list.to_vec())
}

/// Module-scanning registry over the built-in catalog, configured from `config`.
pub fn plugin_registry(config: &Config) -> PluginRegistry<Stage<String>> {
    let discovery = &config.discovery;
    let mut registry = PluginRegistry::new(Arc::new(catalog()))
        .with_default_modules(default_modules())
        .with_enforce_uniqueness(discovery.enforce_uniqueness);
    registry.set_custom_modules(non_empty(&discovery.modules));
    registry.set_custom_excluded_modules(non_empty(&discovery.excluded_modules));
    registry
}

/// Class-lister registry over the built-in catalog, configured from `config`.
pub fn class_lister_registry(config: &Config) -> ClassListerRegistry<Stage<String>> {
    let discovery = &config.discovery;
    let mut registry =
        ClassListerRegistry::new(Arc::new(catalog())).with_default_listers(default_class_listers());
    if config.cache.enabled {
        registry = registry.with_cache(APP_NAME);
    }
    registry.set_custom_listers(non_empty(&discovery.class_listers));
    registry.set_custom_excluded_listers(non_empty(&discovery.excluded_class_listers));
    registry
}

/// Every available reader, filter and writer, keyed by name and alias.
///
/// Class listers are used when configured (in the config file or through
/// `STAGEHAND_CLASS_LISTERS`), module scanning otherwise.
pub fn discover_plugins(config: &Config) -> Result<PluginMap<Stage<String>>, PipelineError> {
    let use_listers =
        !config.discovery.class_listers.is_empty() || std::env::var_os(ENV_CLASS_LISTERS).is_some();

    let mut all = PluginMap::new();
    if use_listers {
        let mut registry = class_lister_registry(config);
        for (base, required) in [(READER_BASE, true), (FILTER_BASE, false), (WRITER_BASE, false)] {
            all.extend(registry.plugins(base, required)?);
        }
    } else {
        let mut registry = plugin_registry(config);
        for (group, base) in [
            (READERS_GROUP, READER_BASE),
            (FILTERS_GROUP, FILTER_BASE),
            (WRITERS_GROUP, WRITER_BASE),
        ] {
            all.extend(
                registry
                    .plugins(group, base)?
                    .iter()
                    .map(|(name, entry)| (name.clone(), entry.clone())),
            );
        }
    }
    tracing::debug!(count = all.len(), via_listers = use_listers, "Plugins available");
    Ok(all)
}
