//! Memoization of loaded resolvers
//!
//! The cache is an explicit, injectable object keyed by (context,
//! software version). Concurrent requests for the same key may race to
//! load but converge on a single cached value; a failed load caches
//! nothing, so later attempts start clean.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::resolver::ConfigResolver;

/// Thread-safe (context, software version) → resolver cache.
#[derive(Debug, Default)]
pub struct ResolverCache {
    inner: Mutex<HashMap<(String, String), Arc<ConfigResolver>>>,
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached resolver for the key, loading it with `load` on
    /// a miss. The lock is not held across `load`; when two callers race,
    /// the first insertion wins and the loser's load is discarded.
    pub fn get_or_load<F>(&self, context: &str, cal_ver: &str, load: F) -> Result<Arc<ConfigResolver>>
    where
        F: FnOnce() -> Result<ConfigResolver>,
    {
        let key = (context.to_string(), cal_ver.to_string());
        if let Some(cached) = self.inner.lock().expect("cache lock").get(&key) {
            return Ok(Arc::clone(cached));
        }
        let loaded = Arc::new(load()?);
        let mut guard = self.inner.lock().expect("cache lock");
        let entry = guard.entry(key).or_insert(loaded);
        Ok(Arc::clone(entry))
    }

    /// Drop every cached entry; mainly for tests switching rule sets.
    pub fn clear(&self) {
        self.inner.lock().expect("cache lock").clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::RuleDocument;
    use crate::error::Error;

    fn resolver(tag: &str) -> ConfigResolver {
        let doc = RuleDocument::from_yaml("test", "exptypes_to_pipelines: {}").unwrap();
        ConfigResolver::new("operational", "0.13.0", tag, doc)
    }

    #[test]
    fn second_lookup_reuses_the_first_load() {
        let cache = ResolverCache::new();
        let first = cache
            .get_or_load("operational", "0.13.0", || Ok(resolver("first")))
            .unwrap();
        let second = cache
            .get_or_load("operational", "0.13.0", || Ok(resolver("second")))
            .unwrap();
        assert_eq!(first.document(), "first");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_keys_load_separately() {
        let cache = ResolverCache::new();
        cache
            .get_or_load("operational", "0.7.0", || Ok(resolver("old")))
            .unwrap();
        cache
            .get_or_load("operational", "0.13.0", || Ok(resolver("new")))
            .unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let cache = ResolverCache::new();
        let failed: Result<_> = cache.get_or_load("operational", "0.13.0", || {
            Err(Error::parse("test", "boom"))
        });
        assert!(failed.is_err());
        assert!(cache.is_empty());
        let recovered = cache
            .get_or_load("operational", "0.13.0", || Ok(resolver("retry")))
            .unwrap();
        assert_eq!(recovered.document(), "retry");
    }

    #[test]
    fn clear_resets_between_cases() {
        let cache = ResolverCache::new();
        cache
            .get_or_load("operational", "0.13.0", || Ok(resolver("x")))
            .unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
