// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Match cache.
//!
//! Memoizes `METHOD:path` → match result, negative results included. There
//! is no expiry; the cache is cleared only when the registry changes or is
//! reset.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::pattern::Params;
use crate::route::Route;

/// How a match was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOrigin {
    /// A registered route.
    Registry,
    /// The implicit home match for `/`.
    Home,
    /// A transient content-fallback route.
    Content,
}

/// A matched route with its captured parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route.
    pub route: Arc<Route>,
    /// Captured parameters, before validation.
    pub params: Params,
    /// Where the match came from.
    pub origin: MatchOrigin,
}

/// Process-lifetime match memo.
#[derive(Debug, Default)]
pub struct MatchCache {
    entries: RwLock<HashMap<String, Option<RouteMatch>>>,
}

impl MatchCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache key for a method and normalized path.
    pub fn key(method: &str, path: &str) -> String {
        format!("{}:{}", method, path)
    }

    /// `None` on a miss; `Some(None)` for a cached "no match".
    pub fn get(&self, key: &str) -> Option<Option<RouteMatch>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Stores a result.
    pub fn insert(&self, key: String, result: Option<RouteMatch>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, result);
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every entry.
    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::CompiledPattern;
    use crate::route::HandlerRef;

    #[test]
    fn test_negative_results_are_cached() {
        let cache = MatchCache::new();
        let key = MatchCache::key("GET", "/missing");
        assert!(cache.get(&key).is_none());

        cache.insert(key.clone(), None);
        assert!(matches!(cache.get(&key), Some(None)));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_positive_results_round_trip() {
        let cache = MatchCache::new();
        let matcher = Arc::new(CompiledPattern::literal("/about"));
        let route = Arc::new(Route {
            method: "GET".into(),
            pattern: "/about".into(),
            matcher,
            handler: HandlerRef::ContentFallback,
            name: None,
            middleware: Vec::new(),
            constraints: Default::default(),
            schema: None,
            group_prefix: String::new(),
        });
        cache.insert(
            MatchCache::key("GET", "/about"),
            Some(RouteMatch {
                route: route.clone(),
                params: Params::new(),
                origin: MatchOrigin::Content,
            }),
        );

        let hit = cache.get("GET:/about").flatten().unwrap();
        assert!(Arc::ptr_eq(&hit.route, &route));
        assert_eq!(hit.origin, MatchOrigin::Content);
    }
}
