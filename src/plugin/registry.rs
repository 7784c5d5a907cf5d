//! Registry of metadata filter factories.

use crate::element::MetadataFilter;
use crate::elements::metadata::{UPDATE_KLV, UpdateKlv};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Constructor for a boxed filter.
pub type FilterFactory = Arc<dyn Fn() -> Box<dyn MetadataFilter> + Send + Sync>;

/// Registry mapping filter names to constructors.
///
/// The registry provides a central place to:
/// - Register filter factories
/// - Query available filters
/// - Create filter instances by name
pub struct FilterRegistry {
    factories: RwLock<HashMap<String, FilterFactory>>,
}

impl FilterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry holding the filters built into this crate.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(UPDATE_KLV, || Box::new(UpdateKlv::new()));
        registry
    }

    /// Register a factory, replacing any previous one with the same name.
    ///
    /// Returns true if a previous factory was replaced.
    pub fn register<F>(&self, name: impl Into<String>, factory: F) -> bool
    where
        F: Fn() -> Box<dyn MetadataFilter> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(filter = %name, "registering metadata filter");
        let mut factories = self.factories.write().unwrap_or_else(PoisonError::into_inner);
        factories.insert(name, Arc::new(factory)).is_some()
    }

    /// Remove a factory by name.
    ///
    /// Returns true if the factory was found and removed.
    pub fn unregister(&self, name: &str) -> bool {
        let mut factories = self.factories.write().unwrap_or_else(PoisonError::into_inner);
        factories.remove(name).is_some()
    }

    /// Check if a filter is available.
    pub fn has_filter(&self, name: &str) -> bool {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        factories.contains_key(name)
    }

    /// Create a filter by name.
    pub fn create(&self, name: &str) -> Option<Box<dyn MetadataFilter>> {
        // Clone the factory out so the lock is not held while constructing.
        let factory = {
            let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
            factories.get(name).cloned()
        };
        match factory {
            Some(factory) => Some((*factory)()),
            None => {
                tracing::warn!(filter = %name, "unknown metadata filter");
                None
            }
        }
    }

    /// List all registered filter names, sorted.
    pub fn names(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataVec;

    struct ClearAll;

    impl MetadataFilter for ClearAll {
        fn filter(&mut self, frames: MetadataVec) -> MetadataVec {
            frames.into_iter().map(|_| None).collect()
        }

        fn name(&self) -> &str {
            "clear"
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = FilterRegistry::new();
        assert!(registry.names().is_empty());
        assert!(registry.create("update_klv").is_none());
    }

    #[test]
    fn test_builtins() {
        let registry = FilterRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["update_klv".to_string()]);
        assert!(registry.has_filter("update_klv"));

        let filter = registry.create("update_klv").unwrap();
        assert_eq!(filter.name(), "update_klv");
    }

    #[test]
    fn test_register_custom() {
        let registry = FilterRegistry::with_builtins();
        assert!(!registry.register("clear", || Box::new(ClearAll)));
        assert!(registry.register("clear", || Box::new(ClearAll)));
        assert_eq!(registry.names(), vec!["clear", "update_klv"]);

        let mut filter = registry.create("clear").unwrap();
        assert_eq!(filter.filter(vec![None, None]), vec![None, None]);

        assert!(registry.unregister("clear"));
        assert!(!registry.unregister("clear"));
        assert!(!registry.has_filter("clear"));
    }

    #[test]
    fn test_create_not_found() {
        let registry = FilterRegistry::with_builtins();
        assert!(registry.create("nonexistent").is_none());
    }
}
