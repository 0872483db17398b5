//! Class discovery through class-lister functions.
//!
//! A class lister reports, per base class, the modules to scan. Listers come
//! from entry points in the `class_lister` group and from a fallback list
//! (custom, environment, or defaults). Classes reported by excluded listers
//! are subtracted from the result.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::env::{process_env, EnvLookup, ListSetting};
use crate::config::{ENV_CLASS_LISTERS, ENV_EXCLUDED_CLASS_LISTERS};
use crate::error::DiscoveryError;
use crate::plugin::Plugin;
use crate::registry::cache::ClassCache;
use crate::registry::catalog::{ClassLookup, InstantiationError, ListerRef};
use crate::registry::entry_points::{EntryPoint, EntryPointSource, EntryPoints};
use crate::registry::plugin_registry::{PluginEntry, PluginMap};

/// Entry-point group holding class-lister declarations.
pub const CLASS_LISTER_GROUP: &str = "class_lister";

pub struct ClassListerRegistry<P> {
    lookup: Arc<dyn ClassLookup<P>>,
    entry_points: Arc<dyn EntryPointSource>,
    listers: ListSetting,
    excluded_listers: ListSetting,
    env: EnvLookup,
    cache_dir: Option<PathBuf>,
    classes: HashMap<String, Vec<String>>,
}

impl<P: Plugin> ClassListerRegistry<P> {
    pub fn new(lookup: Arc<dyn ClassLookup<P>>) -> Self {
        Self {
            lookup,
            entry_points: Arc::new(EntryPoints::new()),
            listers: ListSetting::default().with_env_var(ENV_CLASS_LISTERS),
            excluded_listers: ListSetting::default().with_env_var(ENV_EXCLUDED_CLASS_LISTERS),
            env: process_env(),
            cache_dir: None,
            classes: HashMap::new(),
        }
    }

    pub fn with_entry_points(mut self, source: Arc<dyn EntryPointSource>) -> Self {
        self.entry_points = source;
        self
    }

    pub fn with_default_listers(mut self, listers: Vec<String>) -> Self {
        self.listers.set_defaults(listers);
        self
    }

    pub fn with_excluded_listers(mut self, listers: Vec<String>) -> Self {
        self.excluded_listers.set_defaults(listers);
        self
    }

    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Caches class lists under the user cache directory for `app`.
    pub fn with_cache(self, app: &str) -> Self {
        self.with_cache_dir(ClassCache::default_dir(app))
    }

    /// Caches class lists in `dir`.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Overrides the fallback listers; clears previously determined classes.
    pub fn set_custom_listers(&mut self, listers: Option<Vec<String>>) {
        self.listers.set_custom(listers);
        self.classes.clear();
    }

    pub fn set_custom_excluded_listers(&mut self, listers: Option<Vec<String>>) {
        self.excluded_listers.set_custom(listers);
        self.classes.clear();
    }

    /// Fallback listers in effect, with `DEFAULT` expanded.
    pub fn listers(&self) -> Vec<String> {
        self.listers.resolve(self.env.as_ref())
    }

    pub fn excluded_listers(&self) -> Vec<String> {
        self.excluded_listers.resolve(self.env.as_ref())
    }

    /// Sorted, fully qualified names of the classes derived from `superclass`.
    pub fn classes(&mut self, superclass: &str) -> Vec<String> {
        if let Some(classes) = self.classes.get(superclass) {
            return classes.clone();
        }

        let mut cache = self
            .cache_dir
            .as_deref()
            .map(|dir| ClassCache::in_dir(dir, superclass).with_key(self.settings_key()));
        if let Some(cached) = cache.as_mut().and_then(ClassCache::load) {
            tracing::debug!(superclass, count = cached.len(), "Using cached class list");
            self.classes.insert(superclass.to_string(), cached.clone());
            return cached;
        }

        let classes = self.initialize(superclass);
        if let Some(cache) = cache.as_mut() {
            cache.save(&classes);
        }
        self.classes.insert(superclass.to_string(), classes.clone());
        classes
    }

    /// Instances of every class derived from `superclass`, keyed by plugin name.
    pub fn plugins(&mut self, superclass: &str, fail_if_empty: bool) -> Result<PluginMap<P>, DiscoveryError> {
        let mut result = PluginMap::new();
        for class_name in self.classes(superclass) {
            let class = match self.lookup.find_qualified(&class_name) {
                Ok(class) => class,
                Err(e) => {
                    tracing::error!(class = %class_name, error = %e, "Failed to load class");
                    continue;
                }
            };
            match class.instantiate() {
                Ok(prototype) => {
                    let name = prototype.name().to_string();
                    result.insert(name, Rc::new(PluginEntry::new(class, prototype)));
                }
                Err(InstantiationError::NotImplemented) => {}
                Err(InstantiationError::Failed(reason)) => {
                    tracing::error!(class = %class_name, reason = %reason, "Failed to instantiate class");
                }
            }
        }
        if fail_if_empty && result.is_empty() {
            return Err(DiscoveryError::NoClassesFound(superclass.to_string()));
        }
        Ok(result)
    }

    fn entry_point_listers(&self) -> Vec<String> {
        self.entry_points
            .entry_points(CLASS_LISTER_GROUP)
            .into_iter()
            .filter_map(|declaration| match declaration.parse::<EntryPoint>() {
                Ok(ep) => Some(format!("{}:{}", ep.module, ep.attribute)),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping class lister entry point");
                    None
                }
            })
            .collect()
    }

    /// Everything the class lists depend on, for keying the on-disk cache.
    fn settings_key(&self) -> String {
        let env = self.env.as_ref();
        format!(
            "entry_points={};listers={};overridden={};excluded={}",
            self.entry_point_listers().join(","),
            self.listers().join(","),
            self.listers.is_overridden(env),
            self.excluded_listers().join(",")
        )
    }

    fn initialize(&self, superclass: &str) -> Vec<String> {
        let env = self.env.as_ref();
        let entry_point_listers = self.entry_point_listers();

        let mut all = self.determine_from_listers(superclass, &entry_point_listers);
        if all.is_empty() || self.listers.is_overridden(env) {
            all.extend(self.determine_from_listers(superclass, &self.listers.resolve(env)));
        }

        let excluded = self.determine_from_listers(superclass, &self.excluded_listers.resolve(env));
        for class_name in &excluded {
            all.remove(class_name);
        }

        all.into_iter().collect()
    }

    fn determine_from_listers(&self, superclass: &str, listers: &[String]) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        if listers.is_empty() {
            return result;
        }
        if !self.lookup.has_base(superclass) {
            tracing::error!(
                error = %DiscoveryError::UnknownSuperclass(superclass.to_string()),
                "Cannot determine classes"
            );
            return result;
        }

        let unique: BTreeSet<ListerRef> = listers.iter().map(|l| ListerRef::parse(l)).collect();
        for lister in unique {
            let function = match self.lookup.class_lister(&lister) {
                Ok(function) => function,
                Err(e) => {
                    tracing::error!(lister = %lister, error = %e, "Failed to load class lister");
                    continue;
                }
            };
            let Some(modules) = function().remove(superclass) else {
                continue;
            };
            for module in modules {
                result.extend(self.sub_classes(superclass, &module));
            }
        }
        result
    }

    fn sub_classes(&self, superclass: &str, module: &str) -> Vec<String> {
        let classes = match self.lookup.module_classes(module) {
            Ok(classes) => classes,
            Err(e) => {
                tracing::error!(module, error = %e, "Failed to import module");
                return Vec::new();
            }
        };
        classes
            .into_iter()
            .filter(|c| !c.name.starts_with('_') && !c.name.starts_with("Abstract"))
            .filter(|c| !c.is_abstract && c.is_subclass_of(superclass))
            .filter(|c| match c.instantiate() {
                Ok(_) => true,
                Err(InstantiationError::NotImplemented) => false,
                Err(InstantiationError::Failed(reason)) => {
                    tracing::error!(class = %c.class_name(), reason = %reason, "Failed to instantiate class");
                    false
                }
            })
            .map(|c| c.class_name())
            .collect()
    }
}
