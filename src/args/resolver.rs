//! Maps a command-line token to a known plugin name.

use std::collections::BTreeSet;

/// Resolves tokens against a fixed set of plugin names.
///
/// An exact match always wins. With partial matching enabled, a token that
/// is the prefix of exactly one name resolves to that name; ambiguous or
/// unmatched tokens resolve to nothing.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    names: BTreeSet<String>,
    allow_partial: bool,
}

impl NameResolver {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            allow_partial: false,
        }
    }

    pub fn partial(mut self, allow_partial: bool) -> Self {
        self.allow_partial = allow_partial;
        self
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    pub fn resolve(&self, candidate: &str) -> Option<&str> {
        if let Some(exact) = self.names.get(candidate) {
            return Some(exact.as_str());
        }
        if !self.allow_partial || candidate.is_empty() {
            return None;
        }

        let mut matches = self
            .names
            .range(candidate.to_string()..)
            .take_while(|name| name.starts_with(candidate));
        let first = matches.next()?;
        match matches.next() {
            None => Some(first.as_str()),
            Some(_) => None,
        }
    }
}
