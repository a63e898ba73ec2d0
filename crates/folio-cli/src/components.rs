// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Built-in components and seed routes.
//!
//! The `system` component answers two endpoints:
//!
//! - `system@health` - JSON status of the running site
//! - `system@routes` - JSON listing of the route table

use folio::{Component, PersistedOptions, Response, Route, RouteRow, Router};
use serde::Serialize;
use serde_json::json;

/// Name of the built-in component.
pub const SYSTEM_COMPONENT: &str = "system";

/// Alias of the middleware that marks responses as uncacheable.
pub const NO_STORE: &str = "no-store";

/// A serializable view of a route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    /// HTTP method.
    pub method: String,
    /// Path template.
    pub pattern: String,
    /// Route name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Handler in its display form.
    pub handler: String,
}

impl From<&Route> for RouteSummary {
    fn from(route: &Route) -> Self {
        Self {
            method: route.method.clone(),
            pattern: route.pattern.clone(),
            name: route.name.clone(),
            handler: route.handler.to_string(),
        }
    }
}

/// Summaries of every route, in matching order.
pub fn summarize(router: &Router) -> Vec<RouteSummary> {
    router.routes().iter().map(|route| RouteSummary::from(&**route)).collect()
}

/// Builds the `system` component over a snapshot of the route table.
pub fn system_component(project: &str, routes: Vec<RouteSummary>) -> Component {
    let project = project.to_string();
    let count = routes.len();
    let listing = json!({ "routes": routes });

    Component::new(SYSTEM_COMPONENT)
        .method("health", move |_request, _params| {
            Ok(Response::json(
                200,
                json!({
                    "status": "ok",
                    "project": project,
                    "version": env!("CARGO_PKG_VERSION"),
                    "routes": count,
                }),
            ))
        })
        .method("routes", move |_request, _params| Ok(Response::json(200, listing.clone())))
}

/// Rows written by `folio init`: the system endpoints followed by the
/// root and catch-all content routes.
pub fn seed_rows() -> Vec<RouteRow> {
    let health = PersistedOptions {
        name: Some("health".to_string()),
        ..Default::default()
    };
    let listing = PersistedOptions {
        name: Some("routes".to_string()),
        middleware: vec![NO_STORE.to_string()],
        ..Default::default()
    };

    let mut rows = vec![
        RouteRow::new("GET", "/health", "system@health", health.encode()),
        RouteRow::new("GET", "/api/routes", "system@routes", listing.encode()),
    ];
    rows.extend(folio::loader::default_rows());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::{ComponentRegistry, HandlerRef, Request, RouterConfig};
    use std::sync::Arc;

    #[test]
    fn test_summaries_follow_registration_order() {
        let mut router = Router::new(RouterConfig::default());
        router.get("/health", HandlerRef::bound("system", "health"));
        router.name("health").unwrap();
        router.ensure_defaults();

        let summaries = summarize(&router);
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].handler, "system@health");
        assert_eq!(summaries[0].name.as_deref(), Some("health"));
        assert_eq!(summaries[1].pattern, "/");
        assert_eq!(summaries[2].handler, "<content>");
    }

    #[test]
    fn test_system_component_endpoints() {
        let components = Arc::new(ComponentRegistry::new());
        let mut router = Router::new(RouterConfig::default()).with_resolver(components.clone());
        router.get("/health", HandlerRef::bound(SYSTEM_COMPONENT, "health"));
        router.get("/api/routes", HandlerRef::bound(SYSTEM_COMPONENT, "routes"));
        components.register(system_component("site", summarize(&router)));

        let health = router.dispatch(&Request::new("GET", "/health")).unwrap();
        match health.response().unwrap() {
            Response::Json { body, .. } => {
                assert_eq!(body["status"], "ok");
                assert_eq!(body["project"], "site");
                assert_eq!(body["routes"], 2);
            }
            other => panic!("unexpected {:?}", other),
        }

        let listing = router.dispatch(&Request::new("GET", "/api/routes")).unwrap();
        match listing.response().unwrap() {
            Response::Json { body, .. } => assert_eq!(body["routes"][1]["pattern"], "/api/routes"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_seed_rows_end_with_defaults() {
        let rows = seed_rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].handler, "system@health");
        assert!(rows[1].options.contains(NO_STORE));
        assert_eq!(&rows[2..], folio::loader::default_rows().as_slice());
    }
}
