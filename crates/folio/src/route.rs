// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Route definitions.
//!
//! A [`Route`] ties a method and a compiled path template to a
//! [`HandlerRef`], plus the middleware and parameter schema that apply to
//! it. Routes are immutable once registered; the registry hands them out
//! as `Arc<Route>`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Result, RouterError};
use crate::middleware::{FnMiddleware, Middleware, Next};
use crate::pattern::{CompiledPattern, Params};
use crate::request::Request;
use crate::response::{Dispatch, Response};
use crate::validate::ParamSchema;

/// Inline handler signature.
pub type HandlerFn = dyn Fn(&Request, &Params) -> Result<Response> + Send + Sync;

/// What a route invokes once matched.
#[derive(Clone)]
pub enum HandlerRef {
    /// A closure called with the request and parameters.
    Inline(Arc<HandlerFn>),
    /// A method on a component produced by the dependency resolver.
    Bound {
        /// Component name passed to the resolver.
        component: String,
        /// Method name looked up on the component.
        method: String,
    },
    /// No handler: the caller renders the content identifier directly.
    ContentFallback,
}

impl HandlerRef {
    /// Wraps a closure as an inline handler.
    pub fn inline<F>(handler: F) -> Self
    where
        F: Fn(&Request, &Params) -> Result<Response> + Send + Sync + 'static,
    {
        Self::Inline(Arc::new(handler))
    }

    /// A `component@method` reference.
    pub fn bound(component: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Bound {
            component: component.into(),
            method: method.into(),
        }
    }

    /// Returns true for the content-fallback sentinel.
    pub fn is_content_fallback(&self) -> bool {
        matches!(self, Self::ContentFallback)
    }

    /// The persisted string form, or `None` for inline closures.
    pub fn to_persisted(&self) -> Option<String> {
        match self {
            Self::Inline(_) => None,
            Self::Bound { component, method } => Some(format!("{}@{}", component, method)),
            Self::ContentFallback => Some(String::new()),
        }
    }
}

impl FromStr for HandlerRef {
    type Err = RouterError;

    /// Parses the persisted form: `""` or `"component@method"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::ContentFallback);
        }
        match s.split_once('@') {
            Some((component, method)) if !component.is_empty() && !method.is_empty() => {
                Ok(Self::bound(component, method))
            }
            _ => Err(RouterError::HandlerResolution(format!(
                "invalid handler reference `{}` (expected component@method)",
                s
            ))),
        }
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(_) => write!(f, "Inline(<fn>)"),
            Self::Bound { component, method } => write!(f, "Bound({}@{})", component, method),
            Self::ContentFallback => write!(f, "ContentFallback"),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(_) => write!(f, "<closure>"),
            Self::Bound { component, method } => write!(f, "{}@{}", component, method),
            Self::ContentFallback => write!(f, "<content>"),
        }
    }
}

/// A middleware attached to a route or group.
#[derive(Clone)]
pub enum MiddlewareRef {
    /// Looked up by alias on the router at dispatch time.
    Named(String),
    /// A middleware instance.
    Inline(Arc<dyn Middleware>),
}

impl MiddlewareRef {
    /// References a middleware alias.
    pub fn named(alias: impl Into<String>) -> Self {
        Self::Named(alias.into())
    }

    /// Wraps a closure as inline middleware.
    pub fn inline<F>(middleware: F) -> Self
    where
        F: for<'n> Fn(&Request, &Params, Next<'n>) -> Result<Dispatch> + Send + Sync + 'static,
    {
        Self::Inline(Arc::new(FnMiddleware(middleware)))
    }

    /// The alias, for named references.
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Named(alias) => Some(alias.as_str()),
            Self::Inline(_) => None,
        }
    }
}

impl fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(alias) => write!(f, "Named({})", alias),
            Self::Inline(_) => write!(f, "Inline(<middleware>)"),
        }
    }
}

/// Per-route registration options.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Route name (the group name prefix is prepended).
    pub name: Option<String>,
    /// Route middleware, after any group middleware.
    pub middleware: Vec<MiddlewareRef>,
    /// Sub-pattern overrides keyed by placeholder name.
    pub constraints: HashMap<String, String>,
    /// Parameter validation rules.
    pub schema: Option<ParamSchema>,
}

impl RouteOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the route name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a middleware.
    pub fn middleware(mut self, middleware: MiddlewareRef) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Constrains a placeholder to a sub-pattern.
    pub fn constrain(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.constraints.insert(name.into(), pattern.into());
        self
    }

    /// Sets the parameter schema.
    pub fn schema(mut self, schema: ParamSchema) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// A registered route.
#[derive(Clone)]
pub struct Route {
    /// Upper-cased HTTP method.
    pub method: String,
    /// Full normalized path template, group prefix included.
    pub pattern: String,
    /// Compiled matcher for `pattern`.
    pub matcher: Arc<CompiledPattern>,
    /// What to invoke.
    pub handler: HandlerRef,
    /// Full route name, if any.
    pub name: Option<String>,
    /// Group and route middleware, outermost first.
    pub middleware: Vec<MiddlewareRef>,
    /// Sub-pattern overrides the matcher was compiled with.
    pub constraints: HashMap<String, String>,
    /// Parameter validation rules.
    pub schema: Option<ParamSchema>,
    /// Prefix contributed by enclosing groups.
    pub group_prefix: String,
}

impl Route {
    /// Returns true if the route answers the given (upper-cased) method.
    pub fn allows(&self, method: &str) -> bool {
        self.method == method
    }

    /// Returns true for the `GET /` root route.
    pub fn is_root(&self) -> bool {
        self.method == "GET" && self.pattern == "/"
    }

    /// Returns true for a `GET` route matching every non-root path.
    pub fn is_catch_all(&self) -> bool {
        self.method == "GET" && self.matcher.is_catch_all()
    }

    /// Matches a normalized path.
    pub fn match_path(&self, path: &str) -> Option<Params> {
        self.matcher.match_path(path)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("handler", &self.handler)
            .field("name", &self.name)
            .field("middleware", &self.middleware)
            .field("group_prefix", &self.group_prefix)
            .finish()
    }
}
