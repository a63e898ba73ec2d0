// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Middleware installed by the server.

use std::time::Instant;

use folio::{Dispatch, Middleware, Next, Params, Request, Result};

/// Logs every dispatched request with its outcome and duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessLog;

impl Middleware for AccessLog {
    fn handle(&self, request: &Request, params: &Params, next: Next<'_>) -> Result<Dispatch> {
        let started = Instant::now();
        let result = next.run(request, params);
        let elapsed = started.elapsed();

        match &result {
            Ok(Dispatch::Response(response)) => tracing::info!(
                method = %request.method,
                path = %request.path,
                status = response.status(),
                ?elapsed,
                "request handled"
            ),
            Ok(Dispatch::Content(target)) => tracing::info!(
                method = %request.method,
                path = %request.path,
                content = %target.path,
                ?elapsed,
                "content matched"
            ),
            Err(e) => tracing::warn!(
                method = %request.method,
                path = %request.path,
                status = e.status(),
                ?elapsed,
                "request failed: {}",
                e
            ),
        }

        result
    }
}

/// Adds `Cache-Control: no-store` to handler responses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStore;

impl Middleware for NoStore {
    fn handle(&self, request: &Request, params: &Params, next: Next<'_>) -> Result<Dispatch> {
        Ok(match next.run(request, params)? {
            Dispatch::Response(response) => {
                Dispatch::Response(response.with_header("Cache-Control", "no-store"))
            }
            content => content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::{HandlerRef, MiddlewareRef, Response, RouteOptions, Router, RouterConfig};

    #[test]
    fn test_no_store_sets_header() {
        let mut router = Router::new(RouterConfig::default());
        router.alias("no-store", NoStore).add_route(
            "GET",
            "/api",
            HandlerRef::inline(|_, _| Ok(Response::json(200, serde_json::json!({})))),
            RouteOptions::new().middleware(MiddlewareRef::named("no-store")),
        );

        let result = router.dispatch(&Request::new("GET", "/api")).unwrap();
        assert_eq!(result.response().unwrap().header("Cache-Control"), Some("no-store"));
    }

    #[test]
    fn test_access_log_passes_result_through() {
        let mut router = Router::new(RouterConfig::default());
        router.middleware(MiddlewareRef::Inline(std::sync::Arc::new(AccessLog)));
        router.get("/ok", HandlerRef::inline(|_, _| Ok(Response::html(201, "made"))));

        let result = router.dispatch(&Request::new("GET", "/ok")).unwrap();
        assert_eq!(result.response().unwrap().status(), 201);
        assert!(router.dispatch(&Request::new("POST", "/ok")).is_err());
    }
}
