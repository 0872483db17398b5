//! Data-type tags used for compatibility checks between adjacent plugins.

use std::fmt;

/// A named data type with an optional parent.
///
/// Tags form a single-inheritance hierarchy: a tag is compatible with any of
/// its ancestors. Declare tags as `static`s so children can point at parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    name: &'static str,
    parent: Option<&'static TypeTag>,
}

impl TypeTag {
    pub const fn new(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    pub const fn derived(name: &'static str, parent: &'static TypeTag) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static TypeTag> {
        self.parent
    }

    /// True if `self` is `other` or descends from it.
    pub fn is_a(&self, other: &TypeTag) -> bool {
        if self == other {
            return true;
        }
        let mut current = self.parent;
        while let Some(tag) = current {
            if tag == other {
                return true;
            }
            current = tag.parent;
        }
        false
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The wildcard tag: on either side of a pair, matches everything.
pub static ANY: TypeTag = TypeTag::new("any");

/// Joins tag names for diagnostics.
pub fn describe(tags: &[TypeTag]) -> String {
    tags.iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}
