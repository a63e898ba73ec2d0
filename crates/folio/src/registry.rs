// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Ordered route registry with a name index and group stack.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, RouterError};
use crate::route::{MiddlewareRef, Route};

/// Attributes shared by every route registered inside a group.
#[derive(Debug, Clone, Default)]
pub struct GroupAttributes {
    /// Path prefix.
    pub prefix: String,
    /// Middleware applied before route middleware.
    pub middleware: Vec<MiddlewareRef>,
    /// Prefix prepended to route names.
    pub name_prefix: String,
}

impl GroupAttributes {
    /// A group with the given path prefix.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Appends a middleware.
    pub fn middleware(mut self, middleware: MiddlewareRef) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Sets the name prefix.
    pub fn name_prefix(mut self, name_prefix: impl Into<String>) -> Self {
        self.name_prefix = name_prefix.into();
        self
    }
}

/// Joins two path fragments with exactly one slash between them.
pub fn join_paths(parent: &str, child: &str) -> String {
    let parent = parent.trim().trim_end_matches('/');
    let child = child.trim().trim_start_matches('/');
    match (parent.is_empty(), child.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", child),
        (false, true) => parent.to_string(),
        (false, false) => format!("{}/{}", parent, child),
    }
}

/// Registered routes in registration order.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<Arc<Route>>,
    names: HashMap<String, usize>,
    groups: Vec<GroupAttributes>,
}

impl RouteRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The effective group context: every open group merged, outermost first.
    pub fn current_group(&self) -> GroupAttributes {
        self.groups.iter().fold(GroupAttributes::default(), |acc, group| GroupAttributes {
            prefix: if group.prefix.trim().is_empty() {
                acc.prefix
            } else {
                join_paths(&acc.prefix, &group.prefix)
            },
            middleware: acc.middleware.into_iter().chain(group.middleware.iter().cloned()).collect(),
            name_prefix: format!("{}{}", acc.name_prefix, group.name_prefix),
        })
    }

    /// Opens a nested group.
    pub fn enter_group(&mut self, attributes: GroupAttributes) {
        self.groups.push(attributes);
    }

    /// Closes the innermost group.
    pub fn exit_group(&mut self) {
        self.groups.pop();
    }

    /// Appends a route, indexing its name if it has one.
    pub fn push(&mut self, route: Route) {
        let index = self.routes.len();
        if let Some(name) = route.name.clone() {
            self.index_name(name, index);
        }
        self.routes.push(Arc::new(route));
    }

    /// Names the most recently added route.
    ///
    /// The current group's name prefix is prepended.
    pub fn name_last(&mut self, name: &str) -> Result<String> {
        let index = self.routes.len().checked_sub(1).ok_or(RouterError::EmptyRegistry)?;
        let full = format!("{}{}", self.current_group().name_prefix, name);

        let mut route = Route::clone(&self.routes[index]);
        if let Some(previous) = route.name.take() {
            if self.names.get(&previous) == Some(&index) {
                self.names.remove(&previous);
            }
        }
        route.name = Some(full.clone());
        self.routes[index] = Arc::new(route);
        self.index_name(full.clone(), index);
        Ok(full)
    }

    fn index_name(&mut self, name: String, index: usize) {
        if let Some(previous) = self.names.insert(name.clone(), index) {
            if previous != index {
                tracing::warn!(
                    "route name `{}` reassigned from {} to {}",
                    name,
                    self.routes[previous].pattern,
                    self.routes.get(index).map_or("<new route>", |r| r.pattern.as_str())
                );
            }
        }
    }

    /// Looks up a route by name.
    pub fn by_name(&self, name: &str) -> Option<&Arc<Route>> {
        self.names.get(name).and_then(|&index| self.routes.get(index))
    }

    /// Routes in registration order.
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns true if some route satisfies `predicate`.
    pub fn any(&self, predicate: impl Fn(&Route) -> bool) -> bool {
        self.routes.iter().any(|route| predicate(&**route))
    }

    /// Removes every route, name and open group.
    pub fn clear(&mut self) {
        self.routes.clear();
        self.names.clear();
        self.groups.clear();
    }
}
