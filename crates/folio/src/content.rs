// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Fallback content resolution.
//!
//! When no registered route matches a `GET` request, the router asks a
//! [`ContentStore`] whether the path names a content resource. If it does,
//! a transient route with the content-fallback handler is synthesized. The
//! transient route only ever lives in the match cache.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use crate::pattern::{decode_param, normalize_path, CompiledPattern, Params};
use crate::route::{HandlerRef, Route};

/// Answers whether a content resource exists.
pub trait ContentStore: Send + Sync {
    /// Returns true if `identifier` names an existing resource.
    fn exists(&self, identifier: &str) -> bool;
}

/// A store with no content at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContent;

impl ContentStore for NoContent {
    fn exists(&self, _identifier: &str) -> bool {
        false
    }
}

/// In-memory set of content identifiers.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    identifiers: RwLock<HashSet<String>>,
}

impl MemoryContentStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the given identifiers.
    pub fn with<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifiers: RwLock::new(identifiers.into_iter().map(Into::into).collect()),
        }
    }

    /// Adds an identifier.
    pub fn insert(&self, identifier: impl Into<String>) {
        self.identifiers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier.into());
    }

    /// Removes an identifier.
    pub fn remove(&self, identifier: &str) {
        self.identifiers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(identifier);
    }
}

impl ContentStore for MemoryContentStore {
    fn exists(&self, identifier: &str) -> bool {
        self.identifiers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(identifier)
    }
}

/// Derives the content identifier for a normalized path.
///
/// The leading slash is dropped and percent-escapes are decoded; the root
/// path maps to `home`.
pub fn content_identifier(path: &str, home: &str) -> String {
    match normalize_path(path).trim_start_matches('/') {
        "" => home.to_string(),
        identifier => decode_param(identifier),
    }
}

/// Synthesizes a transient content route if the store has the resource.
pub fn resolve_fallback(store: &dyn ContentStore, path: &str, home: &str) -> Option<(Arc<Route>, Params)> {
    let identifier = content_identifier(path, home);
    if !store.exists(&identifier) {
        tracing::debug!("no content for {} ({})", path, identifier);
        return None;
    }

    tracing::debug!("content fallback for {} -> {}", path, identifier);
    let matcher = Arc::new(CompiledPattern::literal(path));
    let route = Route {
        method: "GET".to_string(),
        pattern: matcher.template().to_string(),
        matcher,
        handler: HandlerRef::ContentFallback,
        name: None,
        middleware: Vec::new(),
        constraints: Default::default(),
        schema: None,
        group_prefix: String::new(),
    };
    Some((Arc::new(route), Params::new()))
}
