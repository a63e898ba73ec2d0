// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP server module.
//!
//! Wires a [`folio::Router`] to its collaborators (SQLite route table,
//! filesystem content store, built-in components) and exposes it over
//! axum.

mod http;
/// Middleware installed on every router built here.
pub mod middleware;

use std::path::Path;
use std::sync::Arc;

use folio::{ComponentRegistry, HandlerRef, MiddlewareRef, RouteOptions, Router};

pub use http::{app, serve};

use crate::components::{summarize, system_component, NO_STORE, SYSTEM_COMPONENT};
use crate::config::Config;
use crate::content::FileContentStore;
use crate::store::SqliteRouteTable;
use middleware::{AccessLog, NoStore};

/// Shared state for request handlers.
pub struct AppState {
    /// The router, fully loaded.
    pub router: Arc<Router>,
    /// Content store used to render content matches.
    pub content: Arc<FileContentStore>,
    /// Components resolvable by `component@method` handlers.
    pub components: Arc<ComponentRegistry>,
}

/// Builds the router and its collaborators for the project at `root`.
///
/// With `persist_routes` the route table lives in `<data_dir>/routes.db`
/// and is loaded here, reseeding it if needed. Otherwise the system
/// endpoints and the default content routes are registered in code.
pub fn build(config: &Config, root: &Path) -> anyhow::Result<AppState> {
    let components = Arc::new(ComponentRegistry::new());
    let content = Arc::new(FileContentStore::new(
        config.content_dir(root),
        config.content.extension.clone(),
    ));

    let mut router = Router::new(config.routing.clone())
        .with_resolver(components.clone())
        .with_content_store(content.clone());

    router
        .middleware(MiddlewareRef::Inline(Arc::new(AccessLog)))
        .alias(NO_STORE, NoStore);

    if config.routing.persist_routes {
        let table = SqliteRouteTable::open(&config.data_dir(root))?;
        router = router.with_table(Arc::new(table));
    } else {
        router.get("/health", HandlerRef::bound(SYSTEM_COMPONENT, "health"));
        router.name("health")?;
        router.add_route(
            "GET",
            "/api/routes",
            HandlerRef::bound(SYSTEM_COMPONENT, "routes"),
            RouteOptions::new()
                .named("routes")
                .middleware(MiddlewareRef::named(NO_STORE)),
        );
        router.ensure_defaults();
    }

    // Loads persisted rows on the first call.
    let summaries = summarize(&router);
    tracing::debug!("router ready with {} route(s)", summaries.len());
    components.register(system_component(&config.project.name, summaries));

    Ok(AppState {
        router: Arc::new(router),
        content,
        components,
    })
}
