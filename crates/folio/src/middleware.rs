// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Middleware pipeline.
//!
//! Middleware wrap the eventual handler invocation. Each one receives the
//! request, the matched parameters and a [`Next`] continuation; it may run
//! code before calling `next`, after it returns, or skip it entirely to
//! short-circuit the request.
//!
//! [`build_pipeline`] folds an ordered list right-to-left, so the first
//! middleware in the list is the outermost layer:
//!
//! ```text
//! M1 enter → M2 enter → handler → M2 exit → M1 exit
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, RouterError};
use crate::pattern::Params;
use crate::request::Request;
use crate::response::Dispatch;
use crate::route::MiddlewareRef;

/// A layer around handler invocation.
pub trait Middleware: Send + Sync {
    /// Handles the request, usually by calling `next.run(request, params)`.
    fn handle(&self, request: &Request, params: &Params, next: Next<'_>) -> Result<Dispatch>;
}

/// Adapts a closure into a [`Middleware`].
pub struct FnMiddleware<F>(pub F);

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'n> Fn(&Request, &Params, Next<'n>) -> Result<Dispatch> + Send + Sync,
{
    fn handle(&self, request: &Request, params: &Params, next: Next<'_>) -> Result<Dispatch> {
        (self.0)(request, params, next)
    }
}

/// The rest of the pipeline, consumed by calling [`Next::run`].
pub struct Next<'a> {
    inner: Box<dyn FnOnce(&Request, &Params) -> Result<Dispatch> + 'a>,
}

impl<'a> Next<'a> {
    /// Wraps a continuation.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&Request, &Params) -> Result<Dispatch> + 'a,
    {
        Self { inner: Box::new(f) }
    }

    /// Runs the remaining middleware and the handler.
    pub fn run(self, request: &Request, params: &Params) -> Result<Dispatch> {
        (self.inner)(request, params)
    }
}

/// Composes middleware around a terminal handler invocation.
pub fn build_pipeline<'a, F>(middleware: &'a [Arc<dyn Middleware>], terminal: F) -> Next<'a>
where
    F: FnOnce(&Request, &Params) -> Result<Dispatch> + 'a,
{
    middleware
        .iter()
        .rev()
        .fold(Next::new(terminal), |next, layer| {
            Next::new(move |request: &Request, params: &Params| layer.handle(request, params, next))
        })
}

/// Turns references into instances, looking aliases up in `aliases`.
///
/// An unknown alias is an error: skipping it could silently drop an
/// access check.
pub fn resolve_middleware(
    refs: &[MiddlewareRef],
    aliases: &HashMap<String, Arc<dyn Middleware>>,
) -> Result<Vec<Arc<dyn Middleware>>> {
    refs.iter()
        .map(|reference| match reference {
            MiddlewareRef::Inline(middleware) => Ok(middleware.clone()),
            MiddlewareRef::Named(alias) => aliases
                .get(alias)
                .cloned()
                .ok_or_else(|| RouterError::MiddlewareNotFound(alias.clone())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;
    use std::sync::Mutex;

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Recorder {
        fn handle(&self, request: &Request, params: &Params, next: Next<'_>) -> Result<Dispatch> {
            self.log.lock().unwrap().push(format!("{}-enter", self.label));
            let result = next.run(request, params);
            self.log.lock().unwrap().push(format!("{}-exit", self.label));
            result
        }
    }

    #[test]
    fn test_onion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let layers: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Recorder { label: "M1", log: log.clone() }),
            Arc::new(Recorder { label: "M2", log: log.clone() }),
        ];

        let handler_log = log.clone();
        let pipeline = build_pipeline(&layers, move |_, _| {
            handler_log.lock().unwrap().push("H".to_string());
            Ok(Dispatch::Response(Response::html(200, "ok")))
        });

        let result = pipeline.run(&Request::default(), &Params::new()).unwrap();
        assert!(result.response().is_some());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["M1-enter", "M2-enter", "H", "M2-exit", "M1-exit"]
        );
    }

    #[test]
    fn test_short_circuit() {
        struct Deny;

        impl Middleware for Deny {
            fn handle(&self, _request: &Request, _params: &Params, _next: Next<'_>) -> Result<Dispatch> {
                Ok(Dispatch::Response(Response::redirect("/login")))
            }
        }

        let layers: Vec<Arc<dyn Middleware>> = vec![Arc::new(Deny)];

        let pipeline = build_pipeline(&layers, |_, _| panic!("handler must not run"));
        let result = pipeline.run(&Request::default(), &Params::new()).unwrap();
        assert_eq!(result.response().map(|r| r.status()), Some(302));
    }

    #[test]
    fn test_unknown_alias_is_an_error() {
        let aliases: HashMap<String, Arc<dyn Middleware>> = HashMap::new();
        let result = resolve_middleware(&[MiddlewareRef::named("auth")], &aliases);
        assert!(matches!(result, Err(RouterError::MiddlewareNotFound(alias)) if alias == "auth"));
    }
}
