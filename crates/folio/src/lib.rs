// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # folio
//!
//! Request router and dispatcher for flat-file content sites.
//!
//! folio matches requests against an ordered list of routes, runs an
//! onion-style middleware pipeline around the matched handler and, when
//! nothing matches, falls back to content resources on disk instead of
//! answering "not found".
//!
//! ## Features
//!
//! - Path templates with typed placeholders (`/items/{id:[0-9]+}`)
//! - First-match-in-registration-order semantics
//! - Route groups with shared prefix, middleware and name prefix
//! - Named routes and reverse URL generation
//! - Per-route parameter schemas
//! - Inline, `component@method` and content-fallback handlers
//! - Route persistence through a pluggable [`RouteTable`]
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use folio::{HandlerRef, MemoryContentStore, Request, Response, Router, RouterConfig};
//!
//! let mut router = Router::new(RouterConfig::default())
//!     .with_content_store(Arc::new(MemoryContentStore::with(["about"])));
//!
//! router.get("/api/ping", HandlerRef::inline(|_, _| Ok(Response::html(200, "pong"))));
//!
//! let ping = router.dispatch(&Request::new("GET", "/api/ping")).unwrap();
//! assert_eq!(ping.response().unwrap().status(), 200);
//!
//! // No route, but the content store knows "about".
//! let about = router.dispatch(&Request::new("GET", "/about")).unwrap();
//! assert_eq!(about.content().unwrap().path, "about");
//! ```

/// Match result cache.
pub mod cache;
/// Router configuration.
pub mod config;
/// Content store and fallback resolution.
pub mod content;
/// Error types.
pub mod error;
/// Handler resolution and execution.
pub mod handler;
/// Persisted route loading.
pub mod loader;
/// Middleware pipeline.
pub mod middleware;
/// Path template compilation and matching.
pub mod pattern;
/// Route registry and groups.
pub mod registry;
/// Request type.
pub mod request;
/// Response and dispatch result types.
pub mod response;
/// Reverse URL generation.
pub mod reverse;
/// Route definitions.
pub mod route;
/// The router.
pub mod router;
/// Route table persistence.
pub mod table;
/// Parameter validation.
pub mod validate;

pub use cache::{MatchCache, MatchOrigin, RouteMatch};
pub use config::RouterConfig;
pub use content::{ContentStore, MemoryContentStore, NoContent};
pub use error::{Result, RouterError};
pub use handler::{Component, ComponentRegistry, DependencyResolver, NoComponents};
pub use middleware::{FnMiddleware, Middleware, Next};
pub use pattern::{normalize_path, CompiledPattern, MatcherEngine, Params, PatternCompiler};
pub use registry::GroupAttributes;
pub use request::Request;
pub use response::{ContentTarget, Dispatch, Response};
pub use route::{HandlerRef, MiddlewareRef, Route, RouteOptions};
pub use router::Router;
pub use table::{MemoryRouteTable, PersistedOptions, RouteRow, RouteTable, TableError, TableResult};
pub use validate::{ParamSchema, ParamType, Rule, RulePattern};

#[cfg(test)]
mod tests;
