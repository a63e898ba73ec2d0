// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Handler resolution and execution.
//!
//! Routes reference their handler through a [`HandlerRef`]. Inline closures
//! are called directly. `component@method` references go through a
//! [`DependencyResolver`], which turns a component name into a
//! [`Component`]: a table of named methods. The content-fallback sentinel
//! produces a [`Dispatch::Content`] for the caller's renderer.
//!
//! # Examples
//!
//! ```rust
//! use folio::{Component, ComponentRegistry, Response};
//!
//! let registry = ComponentRegistry::new();
//! registry.register(
//!     Component::new("post").method("show", |_req, params| {
//!         Ok(Response::html(200, format!("post {}", params["id"])))
//!     }),
//! );
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Result, RouterError};
use crate::pattern::Params;
use crate::request::Request;
use crate::response::{ContentTarget, Dispatch, Response};
use crate::route::{HandlerFn, HandlerRef};

/// Resolves a component name to an instance.
pub trait DependencyResolver: Send + Sync {
    /// Returns the component, or `None` if it cannot be produced.
    fn resolve(&self, name: &str) -> Option<Arc<Component>>;
}

/// A named set of request handlers.
#[derive(Clone)]
pub struct Component {
    name: String,
    methods: HashMap<String, Arc<HandlerFn>>,
}

impl Component {
    /// An empty component.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    /// Adds a method.
    pub fn method<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Request, &Params) -> Result<Response> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(handler));
        self
    }

    /// The component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the component has the method.
    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Invokes a method, failing with a resolution error if it is absent.
    pub fn invoke(&self, method: &str, request: &Request, params: &Params) -> Result<Response> {
        let handler = self.methods.get(method).ok_or_else(|| {
            RouterError::HandlerResolution(format!(
                "component `{}` has no method `{}`",
                self.name, method
            ))
        })?;
        handler(request, params)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("methods", &methods)
            .finish()
    }
}

type Factory = Arc<dyn Fn() -> Option<Component> + Send + Sync>;

enum Entry {
    Ready(Arc<Component>),
    Lazy(Factory),
}

/// In-memory [`DependencyResolver`].
///
/// Components are registered either ready-made or as factories that run
/// on first resolution. A factory returning `None` is a resolution failure
/// and is retried on the next request.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component under its own name.
    pub fn register(&self, component: Component) {
        let name = component.name.clone();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, Entry::Ready(Arc::new(component)));
    }

    /// Registers a factory that builds the component on first use.
    pub fn register_factory<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Option<Component> + Send + Sync + 'static,
    {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), Entry::Lazy(Arc::new(factory)));
    }

    /// Registered component names, sorted.
    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        names
    }
}

impl DependencyResolver for ComponentRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<Component>> {
        let factory = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(name)? {
                Entry::Ready(component) => return Some(component.clone()),
                Entry::Lazy(factory) => factory.clone(),
            }
        };

        let component = Arc::new(factory()?);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Entry::Ready(component.clone()));
        Some(component)
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}

/// A resolver that knows no components.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoComponents;

impl DependencyResolver for NoComponents {
    fn resolve(&self, _name: &str) -> Option<Arc<Component>> {
        None
    }
}

/// Invokes a handler.
///
/// `content_path` is the content identifier used when the handler is the
/// content-fallback sentinel.
pub fn execute(
    handler: &HandlerRef,
    resolver: &dyn DependencyResolver,
    content_path: &str,
    request: &Request,
    params: &Params,
) -> Result<Dispatch> {
    match handler {
        HandlerRef::Inline(f) => f(request, params).map(Dispatch::Response),
        HandlerRef::Bound { component, method } => {
            let instance = resolver.resolve(component).ok_or_else(|| {
                RouterError::HandlerResolution(format!("cannot resolve component `{}`", component))
            })?;
            tracing::debug!("invoking {}@{}", component, method);
            instance.invoke(method, request, params).map(Dispatch::Response)
        }
        HandlerRef::ContentFallback => Ok(Dispatch::Content(ContentTarget {
            path: content_path.to_string(),
            params: params.clone(),
        })),
    }
}
