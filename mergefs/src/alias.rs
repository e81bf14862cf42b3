//! Alias registry mapping short names to resource addresses.

use std::collections::BTreeMap;

use crate::{Address, MergeResult};

/// An address bound to a short name, with an optional content-type override.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alias {
    address: Address,
    content_type: Option<String>,
}

impl Alias {
    /// Bind `address` without an explicit content type.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self {
            address,
            content_type: None,
        }
    }

    /// Parse `address` and bind it without an explicit content type.
    ///
    /// # Errors
    ///
    /// Returns an error when `address` does not parse.
    pub fn parse(address: &str) -> MergeResult<Self> {
        Address::parse(address).map(Self::new)
    }

    /// Attach an explicit content type.
    ///
    /// A `type` query parameter on the address still takes precedence.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The bound address.
    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// The explicit content type, if one was bound.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// Lookup table from alias name to [`Alias`].
///
/// The registry is populated up front and then shared read-only with
/// [`crate::MergeFs`]; merges never mutate it.
#[derive(Clone, Debug, Default)]
pub struct AliasRegistry {
    aliases: BTreeMap<String, Alias>,
}

impl AliasRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias` under `name`, replacing any previous binding.
    ///
    /// Returns the binding that was replaced.
    pub fn register(&mut self, name: impl Into<String>, alias: Alias) -> Option<Alias> {
        let name = name.into();
        tracing::debug!(alias = %name, address = %alias.address, "registered alias");
        self.aliases.insert(name, alias)
    }

    /// Look up the binding for `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }

    /// Iterate over registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    /// Number of registered aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns `true` when no aliases are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_registered_binding() {
        let mut registry = AliasRegistry::new();
        let alias = Alias::parse("file:///tmp/a.txt")
            .expect("address should parse")
            .with_content_type("application/json");
        assert!(registry.register("a", alias.clone()).is_none());

        let found = registry.lookup("a").expect("alias should be registered");
        assert_eq!(found, &alias);
        assert_eq!(found.content_type(), Some("application/json"));
        assert!(registry.lookup("b").is_none());
    }

    #[test]
    fn register_replaces_previous_binding() {
        let mut registry = AliasRegistry::new();
        let first = Alias::parse("one.json").expect("address should parse");
        let second = Alias::parse("two.json").expect("address should parse");
        registry.register("cfg", first.clone());
        let replaced = registry.register("cfg", second);
        assert_eq!(replaced, Some(first));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["cfg"]);
    }
}
