// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use crate::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// Inline handler that answers with a fixed body.
fn reply(body: &'static str) -> HandlerRef {
    HandlerRef::inline(move |_, _| Ok(Response::html(200, body)))
}

fn html_body(dispatch: &Dispatch) -> &str {
    match dispatch.response() {
        Some(Response::Html { body, .. }) => body,
        other => panic!("expected an html response, got {:?}", other),
    }
}

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

// Middleware that records its label and passes the request on.
struct Tag {
    label: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Middleware for Tag {
    fn handle(&self, request: &Request, params: &Params, next: Next<'_>) -> Result<Dispatch> {
        self.log.lock().unwrap().push(self.label);
        next.run(request, params)
    }
}

#[cfg(test)]
mod ordering_tests {
    use super::*;

    #[test]
    fn test_first_registered_route_wins() {
        let mut router = Router::new(RouterConfig::default());
        router.get("/blog/{slug}", reply("generic"));
        router.get("/blog/featured", reply("featured"));

        let result = router.dispatch(&Request::new("GET", "/blog/featured")).unwrap();
        assert_eq!(html_body(&result), "generic");
    }

    #[test]
    fn test_order_is_observable_when_reversed() {
        let mut router = Router::new(RouterConfig::default());
        router.get("/blog/featured", reply("featured"));
        router.get("/blog/{slug}", reply("generic"));

        let result = router.dispatch(&Request::new("GET", "/blog/featured")).unwrap();
        assert_eq!(html_body(&result), "featured");
    }

    #[test]
    fn test_method_mismatch_is_skipped() {
        let mut router = Router::new(RouterConfig::default());
        router.post("/items", reply("create"));
        router.get("/items", reply("list"));

        let result = router.dispatch(&Request::new("GET", "/items")).unwrap();
        assert_eq!(html_body(&result), "list");
    }
}

#[cfg(test)]
mod naming_tests {
    use super::*;

    #[test]
    fn test_last_name_wins() {
        let mut router = Router::new(RouterConfig::default());
        router.get("/a", reply("a")).name("x").unwrap();
        router.get("/b", reply("b")).name("x").unwrap();

        assert_eq!(router.generate_url("x", &Params::new(), false).unwrap(), "/b");
    }

    #[test]
    fn test_name_on_empty_router_fails() {
        let mut router = Router::new(RouterConfig::default());
        assert!(matches!(router.name("x"), Err(RouterError::EmptyRegistry)));
    }

    #[test]
    fn test_missing_parameter_is_named() {
        let mut router = Router::new(RouterConfig::default());
        router.get("/posts/{id}", reply("post")).name("post.show").unwrap();

        let err = router.generate_url("post.show", &Params::new(), false).unwrap_err();
        assert!(matches!(&err, RouterError::MissingParameter { param, .. } if param == "id"));
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn test_generated_values_are_encoded() {
        let mut router = Router::new(RouterConfig::default());
        router.get("/tags/{tag}", reply("tag")).name("tag").unwrap();

        let url = router.generate_url("tag", &params(&[("tag", "c++ & rust")]), false).unwrap();
        assert_eq!(url, "/tags/c%2B%2B%20%26%20rust");

        // The encoded URL routes back to the original value.
        let found = router.find("GET", &url).unwrap();
        assert_eq!(found.params.get("tag").map(String::as_str), Some("c++ & rust"));
    }
}

#[cfg(test)]
mod pattern_tests {
    use super::*;

    #[test]
    fn test_typed_placeholder_routes() {
        let mut router = Router::new(RouterConfig::default());
        router.get("/items/{id:[0-9]+}", reply("item"));

        let found = router.find("GET", "/items/42").unwrap();
        assert_eq!(found.params, params(&[("id", "42")]));
        assert!(router.find("GET", "/items/abc").is_none());
    }

    #[test]
    fn test_pathological_constraint_is_downgraded() {
        let mut router = Router::new(RouterConfig::default());
        router.add_route(
            "GET",
            "/files/{name}",
            reply("file"),
            RouteOptions::new().constrain("name", "(x+x+)+(y*)*z+"),
        );

        let routes = router.routes();
        assert_eq!(routes[0].matcher.downgraded(), &["name".to_string()]);
        assert!(router.find("GET", "/files/anything").is_some());
        assert!(router.find("GET", "/files/a/b").is_none());
    }

    #[test]
    fn test_repeated_slashes_match_like_clean_paths() {
        let mut router = Router::new(RouterConfig::default());
        router.get("/blog/{year}", reply("year"));

        let messy = router.find("GET", "//blog//2024/").unwrap();
        let clean = router.find("GET", "/blog/2024").unwrap();
        assert!(Arc::ptr_eq(&messy.route, &clean.route));
        assert_eq!(messy.params, clean.params);
    }

    #[test]
    fn test_segment_engine_router() {
        let config = RouterConfig {
            matcher: MatcherEngine::Segment,
            ..Default::default()
        };
        let mut router = Router::new(config);
        router.get("/blog/{year}/{slug}", reply("post"));
        router.get("/items/{id:[0-9]+}", reply("item"));

        assert_eq!(
            router.find("GET", "/blog/2024/hello").unwrap().params,
            params(&[("year", "2024"), ("slug", "hello")])
        );
        assert!(router.find("GET", "/items/x").is_none());
    }
}

#[cfg(test)]
mod group_tests {
    use super::*;

    #[test]
    fn test_group_prefix_and_names() {
        let mut router = Router::new(RouterConfig::default());
        router.group(GroupAttributes::prefix("/admin").name_prefix("admin."), |r| {
            r.get("/", reply("dashboard")).name("dashboard").unwrap();
            r.group(GroupAttributes::prefix("/users").name_prefix("users."), |r| {
                r.add_route("GET", "/{id}", reply("user"), RouteOptions::new().named("show"));
            });
        });
        router.get("/outside", reply("outside")).name("outside").unwrap();

        assert_eq!(router.generate_url("admin.dashboard", &Params::new(), false).unwrap(), "/admin");
        assert_eq!(
            router.generate_url("admin.users.show", &params(&[("id", "3")]), false).unwrap(),
            "/admin/users/3"
        );
        assert_eq!(router.generate_url("outside", &Params::new(), false).unwrap(), "/outside");

        let routes = router.routes();
        assert_eq!(routes[1].group_prefix, "/admin/users");
        assert_eq!(routes[2].group_prefix, "");
    }

    #[test]
    fn test_group_middleware_runs_before_route_middleware() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut router = Router::new(RouterConfig::default());
        for label in ["group", "route"] {
            router.alias(label, Tag { label, log: log.clone() });
        }
        router.group(GroupAttributes::prefix("/g").middleware(MiddlewareRef::named("group")), |r| {
            r.add_route(
                "GET",
                "/x",
                reply("x"),
                RouteOptions::new().middleware(MiddlewareRef::named("route")),
            );
        });

        router.dispatch(&Request::new("GET", "/g/x")).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["group", "route"]);
    }
}

#[cfg(test)]
mod middleware_tests {
    use super::*;

    struct Trace {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Trace {
        fn handle(&self, request: &Request, params: &Params, next: Next<'_>) -> Result<Dispatch> {
            self.log.lock().unwrap().push(format!("{}-enter", self.label));
            let result = next.run(request, params);
            self.log.lock().unwrap().push(format!("{}-exit", self.label));
            result
        }
    }

    #[test]
    fn test_global_middleware_onion() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new(RouterConfig::default());
        router.middleware(MiddlewareRef::Inline(Arc::new(Trace { label: "M1", log: log.clone() })));
        router.middleware(MiddlewareRef::Inline(Arc::new(Trace { label: "M2", log: log.clone() })));

        let handler_log = log.clone();
        router.get(
            "/",
            HandlerRef::inline(move |_, _| {
                handler_log.lock().unwrap().push("H".to_string());
                Ok(Response::html(200, "home"))
            }),
        );

        router.dispatch(&Request::new("GET", "/")).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["M1-enter", "M2-enter", "H", "M2-exit", "M1-exit"]
        );
    }

    #[test]
    fn test_global_wraps_route_middleware() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new(RouterConfig::default());
        router.alias("route", Trace { label: "R", log: log.clone() });
        router.middleware(MiddlewareRef::Inline(Arc::new(Trace { label: "G", log: log.clone() })));
        router.add_route(
            "GET",
            "/x",
            reply("x"),
            RouteOptions::new().middleware(MiddlewareRef::named("route")),
        );

        router.dispatch(&Request::new("GET", "/x")).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["G-enter", "R-enter", "R-exit", "G-exit"]);
    }

    #[test]
    fn test_middleware_can_short_circuit() {
        let mut router = Router::new(RouterConfig::default());
        router.add_route(
            "GET",
            "/admin",
            reply("secret"),
            RouteOptions::new().middleware(MiddlewareRef::inline(|req, params, next| {
                if req.header("authorization").is_some() {
                    next.run(req, params)
                } else {
                    Ok(Dispatch::Response(Response::redirect("/login")))
                }
            })),
        );

        let denied = router.dispatch(&Request::new("GET", "/admin")).unwrap();
        assert!(denied.response().unwrap().is_redirect());

        let headers: HashMap<String, String> = [("Authorization".to_string(), "Bearer t".to_string())].into();
        let allowed = router
            .dispatch(&Request::new("GET", "/admin").with_headers(headers))
            .unwrap();
        assert_eq!(html_body(&allowed), "secret");
    }

    #[test]
    fn test_unknown_alias_is_server_error() {
        let mut router = Router::new(RouterConfig::default());
        router.add_route(
            "GET",
            "/x",
            reply("x"),
            RouteOptions::new().middleware(MiddlewareRef::named("auth")),
        );

        let err = router.dispatch(&Request::new("GET", "/x")).unwrap_err();
        assert!(matches!(err, RouterError::MiddlewareNotFound(ref alias) if alias == "auth"));
        assert_eq!(err.status(), 500);
    }
}

#[cfg(test)]
mod handler_tests {
    use super::*;

    fn components() -> Arc<ComponentRegistry> {
        let registry = ComponentRegistry::new();
        registry.register(Component::new("post").method("show", |_, params| {
            Ok(Response::json(200, serde_json::json!({ "id": params["id"] })))
        }));
        Arc::new(registry)
    }

    #[test]
    fn test_bound_handler_dispatch() {
        let mut router = Router::new(RouterConfig::default()).with_resolver(components());
        router.get("/posts/{id}", HandlerRef::bound("post", "show"));

        let result = router.dispatch(&Request::new("GET", "/posts/9")).unwrap();
        match result.response() {
            Some(Response::Json { body, .. }) => assert_eq!(body["id"], "9"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unresolvable_component_is_server_error() {
        let mut router = Router::new(RouterConfig::default());
        router.get("/posts/{id}", HandlerRef::bound("post", "show"));

        let err = router.dispatch(&Request::new("GET", "/posts/9")).unwrap_err();
        assert!(matches!(err, RouterError::HandlerResolution(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_content_fallback_route_returns_target() {
        let mut router = Router::new(RouterConfig::default());
        router.get("/docs/{page}", HandlerRef::ContentFallback);

        let result = router.dispatch(&Request::new("GET", "/docs/intro")).unwrap();
        let target = result.content().unwrap();
        assert_eq!(target.path, "docs/intro");
        assert_eq!(target.params, params(&[("page", "intro")]));
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn router() -> Router {
        let mut schema = ParamSchema::new();
        schema.insert("id".to_string(), Rule::of(ParamType::Integer).range(Some(1.0), None));

        let mut router = Router::new(RouterConfig::default());
        router.add_route(
            "GET",
            "/orders/{id}",
            HandlerRef::inline(|_, params| Ok(Response::html(200, params["id"].clone()))),
            RouteOptions::new().schema(schema),
        );
        router
    }

    #[test]
    fn test_valid_parameters_pass() {
        let result = router().dispatch(&Request::new("GET", "/orders/12")).unwrap();
        assert_eq!(html_body(&result), "12");
    }

    #[test]
    fn test_invalid_parameter_is_bad_request() {
        let router = router();
        for path in ["/orders/abc", "/orders/0"] {
            let err = router.dispatch(&Request::new("GET", path)).unwrap_err();
            assert!(matches!(err, RouterError::InvalidParameter { .. }), "{}", path);
            assert_eq!(err.status(), 400);
        }
    }

    #[test]
    fn test_validation_runs_on_cached_matches() {
        let router = router();
        assert!(router.dispatch(&Request::new("GET", "/orders/0")).is_err());
        assert!(router.dispatch(&Request::new("GET", "/orders/0")).is_err());
        assert!(router.dispatch(&Request::new("GET", "/orders/5")).is_ok());
    }
}

#[cfg(test)]
mod fallback_tests {
    use super::*;

    #[test]
    fn test_content_fallback_without_route() {
        let store = Arc::new(MemoryContentStore::with(["about"]));
        let router = Router::new(RouterConfig::default()).with_content_store(store);

        let result = router.dispatch(&Request::new("GET", "/about")).unwrap();
        assert_eq!(
            result,
            Dispatch::Content(ContentTarget {
                path: "about".to_string(),
                params: Params::new(),
            })
        );

        // The transient route is cached, not registered.
        assert!(router.routes().is_empty());
        assert_eq!(router.find("GET", "/about").unwrap().origin, MatchOrigin::Content);
    }

    #[test]
    fn test_missing_content_is_not_found() {
        let router = Router::new(RouterConfig::default());
        let err = router.dispatch(&Request::new("GET", "/nope")).unwrap_err();
        assert!(matches!(err, RouterError::RouteNotFound { ref path, .. } if path == "/nope"));
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_fallback_only_for_get() {
        let store = Arc::new(MemoryContentStore::with(["about"]));
        let router = Router::new(RouterConfig::default()).with_content_store(store);
        assert!(router.dispatch(&Request::new("POST", "/about")).is_err());
    }

    #[test]
    fn test_escaped_path_resolves_decoded_content() {
        let store = Arc::new(MemoryContentStore::with(["hello world"]));
        let router = Router::new(RouterConfig::default()).with_content_store(store);

        let result = router.dispatch(&Request::new("GET", "/hello%20world")).unwrap();
        assert_eq!(result.content().unwrap().path, "hello world");
    }

    #[test]
    fn test_catch_all_target_matches_decoded_param() {
        let mut router = Router::new(RouterConfig::default());
        router.ensure_defaults();

        let result = router.dispatch(&Request::new("GET", "/notes/hello%20world")).unwrap();
        let target = result.content().unwrap();
        assert_eq!(target.path, "notes/hello world");
        assert_eq!(target.params["path"], "notes/hello world");
    }

    #[test]
    fn test_home_uses_configured_identifier() {
        let config = RouterConfig {
            home: "index".into(),
            ..Default::default()
        };
        let router = Router::new(config);
        let result = router.dispatch(&Request::new("GET", "")).unwrap();
        assert_eq!(result.content().unwrap().path, "index");
    }

    #[test]
    fn test_negative_result_is_cached_until_reset() {
        let store = Arc::new(MemoryContentStore::new());
        let router = Router::new(RouterConfig::default()).with_content_store(store.clone());

        assert!(router.find("GET", "/late").is_none());
        store.insert("late");
        // Still a cached miss.
        assert!(router.find("GET", "/late").is_none());

        router.reset();
        assert!(router.find("GET", "/late").is_some());
    }
}

#[cfg(test)]
mod persistence_tests {
    use super::*;

    fn persistent(table: Arc<MemoryRouteTable>) -> Router {
        let config = RouterConfig {
            persist_routes: true,
            ..Default::default()
        };
        Router::new(config).with_table(table)
    }

    #[test]
    fn test_empty_table_yields_default_routes() {
        let table = Arc::new(MemoryRouteTable::new());
        let router = persistent(table.clone());

        let routes = router.routes();
        assert_eq!(routes.len(), 2);
        assert!(routes[0].is_root());
        assert!(routes[1].is_catch_all());

        let home = router.dispatch(&Request::new("GET", "/")).unwrap();
        assert_eq!(home.content().unwrap().path, "home");

        // The table was reseeded.
        assert_eq!(table.rows().map(|rows| rows.len()), Some(2));
    }

    #[test]
    fn test_missing_table_yields_default_routes() {
        let router = persistent(Arc::new(MemoryRouteTable::missing()));
        assert_eq!(router.routes().len(), 2);
        assert!(router.dispatch(&Request::new("GET", "/")).is_ok());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let table = Arc::new(MemoryRouteTable::with_rows(vec![
            RouteRow::new("GET", "/good", "page@show", r#"{"name":"good"}"#),
            RouteRow::new("GET", "/bad", "page@show", "{oops"),
        ]));
        let router = persistent(table);

        let patterns: Vec<String> = router.routes().iter().map(|r| r.pattern.clone()).collect();
        assert_eq!(patterns, vec!["/good", "/", "/{path:.+}"]);
        assert_eq!(router.generate_url("good", &Params::new(), false).unwrap(), "/good");
    }

    #[test]
    fn test_persisted_options_are_applied() {
        let table = Arc::new(MemoryRouteTable::with_rows(vec![RouteRow::new(
            "GET",
            "/orders/{id}",
            "",
            r#"{"where":{"id":"[0-9]+"},"schema":{"id":{"type":"integer","max":100}},"middleware":["audit"]}"#,
        )]));
        let mut router = persistent(table);
        let log = Arc::new(Mutex::new(Vec::new()));
        router.alias("audit", Tag { label: "audit", log: log.clone() });

        assert!(router.dispatch(&Request::new("GET", "/orders/7")).is_ok());
        let err = router.dispatch(&Request::new("GET", "/orders/700")).unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(*log.lock().unwrap(), vec!["audit"]);
    }

    #[test]
    fn test_catch_all_defers_to_content() {
        let router = persistent(Arc::new(MemoryRouteTable::new()));
        let result = router.dispatch(&Request::new("GET", "/guides/setup")).unwrap();
        let target = result.content().unwrap();
        assert_eq!(target.path, "guides/setup");
        assert_eq!(target.params.get("path").map(String::as_str), Some("guides/setup"));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let table = Arc::new(MemoryRouteTable::new());
        let mut router = Router::new(RouterConfig::default()).with_table(table.clone());
        router.add_route(
            "GET",
            "/posts/{id}",
            HandlerRef::bound("post", "show"),
            RouteOptions::new().named("post.show").constrain("id", "[0-9]+"),
        );
        router.ensure_defaults();
        assert_eq!(router.save_routes().unwrap(), 3);

        let reloaded = persistent(table);
        assert_eq!(reloaded.routes().len(), 3);
        assert_eq!(
            reloaded.generate_url("post.show", &params(&[("id", "5")]), false).unwrap(),
            "/posts/5"
        );
        assert!(reloaded.find("GET", "/posts/x").map_or(true, |m| m.route.is_catch_all()));
    }
}
