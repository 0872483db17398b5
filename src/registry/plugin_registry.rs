//! Plugin discovery: entry points first, module scanning as fallback.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use crate::config::env::{process_env, EnvLookup, ListSetting};
use crate::config::{ENV_EXCLUDED_MODULES, ENV_MODULES};
use crate::error::ConfigurationError;
use crate::plugin::Plugin;
use crate::registry::catalog::{ClassLookup, InstantiationError, ListerRef, PluginClass};
use crate::registry::entry_points::{EntryPoint, EntryPointSource, EntryPoints};

/// A discovered plugin: its class plus the prototype built at discovery.
#[derive(Debug)]
pub struct PluginEntry<P> {
    class: PluginClass<P>,
    prototype: P,
}

impl<P> PluginEntry<P> {
    pub(crate) fn new(class: PluginClass<P>, prototype: P) -> Self {
        Self { class, prototype }
    }

    pub fn class(&self) -> &PluginClass<P> {
        &self.class
    }

    /// The instance built at discovery, used for names, help and type tags.
    pub fn prototype(&self) -> &P {
        &self.prototype
    }

    /// A fresh, independent instance of the same class.
    pub fn instantiate(&self) -> Result<P, InstantiationError> {
        self.class.instantiate()
    }
}

/// Name (primary or alias) → plugin.
pub type PluginMap<P> = BTreeMap<String, Rc<PluginEntry<P>>>;

/// How entry-point declarations are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPointMode {
    /// `name=module:Class` names the plugin class itself.
    Explicit,
    /// `name=module:function` names a class lister that reports modules to scan.
    Dynamic,
}

pub struct PluginRegistry<P> {
    lookup: Arc<dyn ClassLookup<P>>,
    entry_points: Arc<dyn EntryPointSource>,
    mode: EntryPointMode,
    modules: ListSetting,
    excluded_modules: ListSetting,
    enforce_uniqueness: bool,
    env: EnvLookup,
    plugins: HashMap<String, PluginMap<P>>,
    /// Every registered name → owning class name, across all groups.
    all_plugins: HashMap<String, String>,
    aliases: BTreeSet<String>,
}

impl<P: Plugin> PluginRegistry<P> {
    pub fn new(lookup: Arc<dyn ClassLookup<P>>) -> Self {
        Self {
            lookup,
            entry_points: Arc::new(EntryPoints::new()),
            mode: EntryPointMode::Explicit,
            modules: ListSetting::default().with_env_var(ENV_MODULES),
            excluded_modules: ListSetting::default().with_env_var(ENV_EXCLUDED_MODULES),
            enforce_uniqueness: true,
            env: process_env(),
            plugins: HashMap::new(),
            all_plugins: HashMap::new(),
            aliases: BTreeSet::new(),
        }
    }

    pub fn with_entry_points(mut self, source: Arc<dyn EntryPointSource>) -> Self {
        self.entry_points = source;
        self
    }

    pub fn with_mode(mut self, mode: EntryPointMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_default_modules(mut self, modules: Vec<String>) -> Self {
        self.modules.set_defaults(modules);
        self
    }

    pub fn with_excluded_modules(mut self, modules: Vec<String>) -> Self {
        self.excluded_modules.set_defaults(modules);
        self
    }

    pub fn with_enforce_uniqueness(mut self, enforce: bool) -> Self {
        self.enforce_uniqueness = enforce;
        self
    }

    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Overrides the modules to scan; clears previously discovered plugins.
    pub fn set_custom_modules(&mut self, modules: Option<Vec<String>>) {
        self.modules.set_custom(modules);
        self.clear();
    }

    pub fn set_custom_excluded_modules(&mut self, modules: Option<Vec<String>>) {
        self.excluded_modules.set_custom(modules);
        self.clear();
    }

    /// Forgets everything discovered so far.
    pub fn clear(&mut self) {
        self.plugins.clear();
        self.all_plugins.clear();
        self.aliases.clear();
    }

    pub fn modules(&self) -> Vec<String> {
        self.modules.resolve(self.env.as_ref())
    }

    pub fn excluded_modules(&self) -> Vec<String> {
        self.excluded_modules.resolve(self.env.as_ref())
    }

    /// Plugins of `group` deriving from `base`, discovered on first use.
    ///
    /// Broken entry points and modules are logged and skipped. Two different
    /// classes claiming the same name is fatal while uniqueness is enforced.
    pub fn plugins(&mut self, group: &str, base: &str) -> Result<&PluginMap<P>, ConfigurationError> {
        if !self.plugins.contains_key(group) {
            let discovered = self.discover(group, base)?;
            tracing::debug!(group, base, count = discovered.len(), "Plugins discovered");
            self.plugins.insert(group.to_string(), discovered);
        }
        Ok(&self.plugins[group])
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains(name)
    }

    /// Sorted aliases of every plugin discovered so far.
    pub fn aliases(&self) -> Vec<String> {
        self.aliases.iter().cloned().collect()
    }

    fn discover(&mut self, group: &str, base: &str) -> Result<PluginMap<P>, ConfigurationError> {
        let mut result = PluginMap::new();

        for declaration in self.entry_points.entry_points(group) {
            let entry_point: EntryPoint = match declaration.parse() {
                Ok(ep) => ep,
                Err(e) => {
                    tracing::warn!(group, error = %e, "Skipping entry point");
                    continue;
                }
            };
            match self.mode {
                EntryPointMode::Explicit => {
                    match self
                        .lookup
                        .find_class(&entry_point.module, &entry_point.attribute)
                    {
                        Ok(class) if class.is_subclass_of(base) => {
                            self.consider(&mut result, class)?;
                        }
                        Ok(class) => tracing::debug!(
                            class = %class.class_name(),
                            base,
                            "Entry point class does not derive from base"
                        ),
                        Err(e) => tracing::error!(
                            entry_point = %declaration,
                            error = %e,
                            "Failed to load entry point"
                        ),
                    }
                }
                EntryPointMode::Dynamic => {
                    let lister = ListerRef {
                        module: entry_point.module.clone(),
                        function: entry_point.attribute.clone(),
                    };
                    match self.lookup.class_lister(&lister) {
                        Ok(function) => {
                            let modules = function().remove(base).unwrap_or_default();
                            for module in modules {
                                self.scan_module(&mut result, &module, base)?;
                            }
                        }
                        Err(e) => tracing::error!(
                            lister = %lister,
                            error = %e,
                            "Failed to load class lister"
                        ),
                    }
                }
            }
        }

        let env = self.env.clone();
        if result.is_empty() || self.modules.is_overridden(env.as_ref()) {
            for module in self.modules.resolve(env.as_ref()) {
                self.scan_module(&mut result, &module, base)?;
            }
        }

        Ok(result)
    }

    fn scan_module(
        &mut self,
        result: &mut PluginMap<P>,
        module: &str,
        base: &str,
    ) -> Result<(), ConfigurationError> {
        let classes = match self.lookup.module_classes(module) {
            Ok(classes) => classes,
            Err(e) => {
                tracing::error!(module, error = %e, "Failed to scan module");
                return Ok(());
            }
        };
        for class in classes {
            if class.name.starts_with('_') || !class.is_subclass_of(base) {
                continue;
            }
            self.consider(result, class)?;
        }
        Ok(())
    }

    fn is_excluded(&self, class: &PluginClass<P>) -> bool {
        self.excluded_modules()
            .iter()
            .any(|prefix| class.module.starts_with(prefix.as_str()))
    }

    fn consider(
        &mut self,
        result: &mut PluginMap<P>,
        class: PluginClass<P>,
    ) -> Result<(), ConfigurationError> {
        if class.is_abstract {
            return Ok(());
        }
        if self.is_excluded(&class) {
            tracing::debug!(class = %class.class_name(), "Excluded by module prefix");
            return Ok(());
        }
        match class.instantiate() {
            Ok(prototype) => self.register(result, class, prototype),
            Err(InstantiationError::NotImplemented) => Ok(()),
            Err(InstantiationError::Failed(reason)) => {
                tracing::error!(
                    class = %class.class_name(),
                    reason = %reason,
                    "Problem encountered instantiating plugin"
                );
                Ok(())
            }
        }
    }

    fn register(
        &mut self,
        result: &mut PluginMap<P>,
        class: PluginClass<P>,
        prototype: P,
    ) -> Result<(), ConfigurationError> {
        let class_name = class.class_name();
        let primary = prototype.name().to_string();
        let aliases: Vec<String> = prototype.aliases().iter().map(|a| a.to_string()).collect();

        if self.enforce_uniqueness {
            for name in std::iter::once(&primary).chain(&aliases) {
                if let Some(existing) = self.all_plugins.get(name) {
                    if *existing != class_name {
                        return Err(ConfigurationError::DuplicateName {
                            name: name.clone(),
                            existing: existing.clone(),
                            new: class_name,
                        });
                    }
                }
            }
        }

        let entry = Rc::new(PluginEntry::new(class, prototype));
        for name in std::iter::once(&primary).chain(&aliases) {
            self.all_plugins.insert(name.clone(), class_name.clone());
            result.insert(name.clone(), Rc::clone(&entry));
        }
        self.aliases.extend(aliases);
        Ok(())
    }
}
