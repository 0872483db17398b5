//! Static class tables standing in for importable modules.
//!
//! Each module lists the plugin classes it defines. A class records its
//! ancestry by base-class name, whether it is abstract, and a factory that
//! builds a fresh instance.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use crate::error::DiscoveryError;

/// Why a factory did not produce an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstantiationError {
    /// The class is a template that cannot be instantiated; skipped silently.
    #[error("not implemented")]
    NotImplemented,

    #[error("{0}")]
    Failed(String),
}

pub type Factory<P> = fn() -> Result<P, InstantiationError>;

/// A function returning, per base-class name, the modules to scan.
pub type ClassLister = fn() -> BTreeMap<String, Vec<String>>;

/// Function name assumed when a class-lister reference omits one.
pub const DEFAULT_LISTER_FUNCTION: &str = "list_classes";

pub struct PluginClass<P> {
    pub module: &'static str,
    pub name: &'static str,
    /// Names of every base class, nearest first.
    pub ancestors: &'static [&'static str],
    pub is_abstract: bool,
    pub factory: Factory<P>,
}

impl<P> PluginClass<P> {
    pub const fn new(
        module: &'static str,
        name: &'static str,
        ancestors: &'static [&'static str],
        factory: Factory<P>,
    ) -> Self {
        Self {
            module,
            name,
            ancestors,
            is_abstract: false,
            factory,
        }
    }

    pub const fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Fully qualified `module.Name`.
    pub fn class_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }

    pub fn is_subclass_of(&self, base: &str) -> bool {
        self.name == base || self.ancestors.contains(&base)
    }

    pub fn instantiate(&self) -> Result<P, InstantiationError> {
        (self.factory)()
    }
}

impl<P> Clone for PluginClass<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for PluginClass<P> {}

impl<P> fmt::Debug for PluginClass<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginClass")
            .field("module", &self.module)
            .field("name", &self.name)
            .field("ancestors", &self.ancestors)
            .field("is_abstract", &self.is_abstract)
            .finish()
    }
}

/// `module:function` reference to a class lister.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListerRef {
    pub module: String,
    pub function: String,
}

impl ListerRef {
    /// Parses `module[:function]`; the function defaults to `list_classes`.
    pub fn parse(spec: &str) -> Self {
        match spec.split_once(':') {
            Some((module, function)) if !function.trim().is_empty() => Self {
                module: module.trim().to_string(),
                function: function.trim().to_string(),
            },
            Some((module, _)) => Self {
                module: module.trim().to_string(),
                function: DEFAULT_LISTER_FUNCTION.to_string(),
            },
            None => Self {
                module: spec.trim().to_string(),
                function: DEFAULT_LISTER_FUNCTION.to_string(),
            },
        }
    }
}

impl fmt::Display for ListerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.function)
    }
}

/// The module-scanning capability discovery relies on.
pub trait ClassLookup<P> {
    /// All classes defined in `module`.
    fn module_classes(&self, module: &str) -> Result<Vec<PluginClass<P>>, DiscoveryError>;

    fn class_lister(&self, lister: &ListerRef) -> Result<ClassLister, DiscoveryError>;

    /// Whether `base` names a known base class.
    fn has_base(&self, base: &str) -> bool;

    fn find_class(&self, module: &str, name: &str) -> Result<PluginClass<P>, DiscoveryError> {
        self.module_classes(module)?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DiscoveryError::UnknownClass {
                module: module.to_string(),
                class: name.to_string(),
            })
    }

    /// Looks up a fully qualified `module.Name`.
    fn find_qualified(&self, class_name: &str) -> Result<PluginClass<P>, DiscoveryError> {
        let (module, name) = class_name
            .rsplit_once('.')
            .ok_or_else(|| DiscoveryError::UnknownModule(class_name.to_string()))?;
        self.find_class(module, name)
    }
}

/// In-memory [`ClassLookup`] built up at startup.
pub struct ModuleCatalog<P> {
    modules: BTreeMap<String, Vec<PluginClass<P>>>,
    listers: BTreeMap<ListerRef, ClassLister>,
    bases: BTreeSet<String>,
}

impl<P> Default for ModuleCatalog<P> {
    fn default() -> Self {
        Self {
            modules: BTreeMap::new(),
            listers: BTreeMap::new(),
            bases: BTreeSet::new(),
        }
    }
}

impl<P> ModuleCatalog<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.bases.insert(base.into());
        self
    }

    /// Registers a module's classes. Their ancestors become known bases.
    pub fn with_module(mut self, module: impl Into<String>, classes: Vec<PluginClass<P>>) -> Self {
        for class in &classes {
            self.bases
                .extend(class.ancestors.iter().map(|a| a.to_string()));
        }
        self.modules.entry(module.into()).or_default().extend(classes);
        self
    }

    pub fn with_lister(mut self, lister: &str, function: ClassLister) -> Self {
        self.listers.insert(ListerRef::parse(lister), function);
        self
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

impl<P> ClassLookup<P> for ModuleCatalog<P> {
    fn module_classes(&self, module: &str) -> Result<Vec<PluginClass<P>>, DiscoveryError> {
        self.modules
            .get(module)
            .cloned()
            .ok_or_else(|| DiscoveryError::UnknownModule(module.to_string()))
    }

    fn class_lister(&self, lister: &ListerRef) -> Result<ClassLister, DiscoveryError> {
        if let Some(function) = self.listers.get(lister) {
            return Ok(*function);
        }
        let module_known = self.modules.contains_key(&lister.module)
            || self.listers.keys().any(|l| l.module == lister.module);
        if module_known {
            Err(DiscoveryError::UnknownLister {
                module: lister.module.clone(),
                function: lister.function.clone(),
            })
        } else {
            Err(DiscoveryError::UnknownModule(lister.module.clone()))
        }
    }

    fn has_base(&self, base: &str) -> bool {
        self.bases.contains(base)
    }
}
