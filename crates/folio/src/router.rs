// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The request router and dispatcher.
//!
//! A [`Router`] owns the route registry, the pattern compiler, the match
//! cache and the collaborators it needs to run handlers. Routes are
//! registered through `&mut self` before serving starts; matching and
//! dispatch take `&self`, so one router can be shared behind an `Arc`.
//!
//! # Matching
//!
//! 1. The path is normalized and `METHOD:path` is looked up in the match
//!    cache (negative results are cached too).
//! 2. Registered routes are tried in registration order; the first one
//!    whose method and pattern match wins.
//! 3. For `/` (any method), an implicit home match is synthesized.
//! 4. For any other `GET` path, the content store is asked whether the path
//!    names a content resource; if so a transient content route matches.
//!
//! Parameter schemas are checked after the match. A failing rule is an
//! [`RouterError::InvalidParameter`], not a "not found".
//!
//! # Examples
//!
//! ```rust
//! use folio::{HandlerRef, Request, Response, Router, RouterConfig};
//!
//! let mut router = Router::new(RouterConfig::default());
//! router.get("/hello/{name}", HandlerRef::inline(|_req, params| {
//!     Ok(Response::html(200, format!("Hello, {}!", params["name"])))
//! }));
//! router.name("hello").unwrap();
//!
//! let result = router.dispatch(&Request::new("GET", "/hello/world")).unwrap();
//! assert_eq!(result.response().unwrap().status(), 200);
//! assert_eq!(router.generate_url("hello", &[("name".to_string(), "ada".to_string())].into(), false).unwrap(), "/hello/ada");
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::cache::{MatchCache, MatchOrigin, RouteMatch};
use crate::config::RouterConfig;
use crate::content::{content_identifier, resolve_fallback, ContentStore, NoContent};
use crate::error::{Result, RouterError};
use crate::handler::{execute, DependencyResolver, NoComponents};
use crate::loader::{self, RouteDefinition, CATCH_ALL_PATTERN, ROOT_PATTERN};
use crate::middleware::{build_pipeline, resolve_middleware, Middleware};
use crate::pattern::{normalize_path, CompiledPattern, Params, PatternCompiler};
use crate::registry::{join_paths, GroupAttributes, RouteRegistry};
use crate::request::Request;
use crate::response::Dispatch;
use crate::reverse;
use crate::route::{HandlerRef, MiddlewareRef, Route, RouteOptions};
use crate::table::{PersistedOptions, RouteRow, RouteTable, TableError};
use crate::validate::{validate, ParamSchema};

/// Request router and dispatcher.
pub struct Router {
    config: RouterConfig,
    registry: RwLock<RouteRegistry>,
    compiler: PatternCompiler,
    cache: MatchCache,
    global_middleware: Vec<MiddlewareRef>,
    aliases: HashMap<String, Arc<dyn Middleware>>,
    resolver: Arc<dyn DependencyResolver>,
    content: Arc<dyn ContentStore>,
    table: Option<Arc<dyn RouteTable>>,
    loaded: AtomicBool,
}

impl Router {
    /// Creates a router with no components, no content and no route table.
    pub fn new(config: RouterConfig) -> Self {
        Self {
            compiler: PatternCompiler::new(config.matcher),
            config,
            registry: RwLock::new(RouteRegistry::new()),
            cache: MatchCache::new(),
            global_middleware: Vec::new(),
            aliases: HashMap::new(),
            resolver: Arc::new(NoComponents),
            content: Arc::new(NoContent),
            table: None,
            loaded: AtomicBool::new(false),
        }
    }

    /// Sets the resolver used for `component@method` handlers.
    pub fn with_resolver(mut self, resolver: Arc<dyn DependencyResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Sets the store consulted by the content fallback.
    pub fn with_content_store(mut self, content: Arc<dyn ContentStore>) -> Self {
        self.content = content;
        self
    }

    /// Sets the persisted route table.
    pub fn with_table(mut self, table: Arc<dyn RouteTable>) -> Self {
        self.table = Some(table);
        self
    }

    /// The router configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Registers a route inside the current group context.
    pub fn add_route(&mut self, method: &str, pattern: &str, handler: HandlerRef, options: RouteOptions) -> &mut Self {
        let registry = self.registry.get_mut().unwrap_or_else(PoisonError::into_inner);
        let group = registry.current_group();

        let full_pattern = if group.prefix.is_empty() {
            pattern.to_string()
        } else {
            join_paths(&group.prefix, pattern)
        };
        let RouteOptions {
            name,
            middleware,
            constraints,
            schema,
        } = options;

        let route = Self::build_route(
            &self.compiler,
            method,
            &full_pattern,
            handler,
            name.map(|name| format!("{}{}", group.name_prefix, name)),
            group.middleware.into_iter().chain(middleware).collect(),
            constraints,
            schema,
            group.prefix,
        );
        tracing::debug!("registered {} {}", route.method, route.pattern);
        registry.push(route);
        self.cache.clear();
        self
    }

    /// Registers a `GET` route.
    pub fn get(&mut self, pattern: &str, handler: HandlerRef) -> &mut Self {
        self.add_route("GET", pattern, handler, RouteOptions::default())
    }

    /// Registers a `POST` route.
    pub fn post(&mut self, pattern: &str, handler: HandlerRef) -> &mut Self {
        self.add_route("POST", pattern, handler, RouteOptions::default())
    }

    /// Registers a `PUT` route.
    pub fn put(&mut self, pattern: &str, handler: HandlerRef) -> &mut Self {
        self.add_route("PUT", pattern, handler, RouteOptions::default())
    }

    /// Registers a `PATCH` route.
    pub fn patch(&mut self, pattern: &str, handler: HandlerRef) -> &mut Self {
        self.add_route("PATCH", pattern, handler, RouteOptions::default())
    }

    /// Registers a `DELETE` route.
    pub fn delete(&mut self, pattern: &str, handler: HandlerRef) -> &mut Self {
        self.add_route("DELETE", pattern, handler, RouteOptions::default())
    }

    /// Registers one route per method, in the given order.
    ///
    /// A name in `options` ends up on every route; the last one wins.
    pub fn match_methods(
        &mut self,
        methods: &[&str],
        pattern: &str,
        handler: HandlerRef,
        options: RouteOptions,
    ) -> &mut Self {
        for method in methods {
            self.add_route(method, pattern, handler.clone(), options.clone());
        }
        self
    }

    /// Names the most recently registered route.
    pub fn name(&mut self, label: &str) -> Result<&mut Self> {
        self.registry
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .name_last(label)?;
        Ok(self)
    }

    /// Registers routes inside a group.
    ///
    /// Prefixes are joined, middleware lists are concatenated parent first
    /// and name prefixes are concatenated. Groups nest.
    pub fn group<F, T>(&mut self, attributes: GroupAttributes, register: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        self.registry
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .enter_group(attributes);
        let result = register(self);
        self.registry
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .exit_group();
        result
    }

    /// Adds global middleware, applied outside every route's own middleware.
    pub fn middleware(&mut self, middleware: MiddlewareRef) -> &mut Self {
        self.global_middleware.push(middleware);
        self
    }

    /// Registers a middleware under an alias.
    pub fn alias<M>(&mut self, alias: impl Into<String>, middleware: M) -> &mut Self
    where
        M: Middleware + 'static,
    {
        self.aliases.insert(alias.into(), Arc::new(middleware));
        self
    }

    /// Adds the root and catch-all content routes if they are missing.
    pub fn ensure_defaults(&mut self) -> &mut Self {
        let registry = self.registry.get_mut().unwrap_or_else(PoisonError::into_inner);
        Self::apply_defaults(registry, &self.compiler);
        self.cache.clear();
        self
    }

    /// Clears routes, names, open groups and cached matches.
    ///
    /// Persisted routes are loaded again on next use.
    pub fn reset(&self) {
        self.registry.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.cache.clear();
        self.compiler.clear();
        self.loaded.store(false, Ordering::Release);
        tracing::debug!("router reset");
    }

    #[allow(clippy::too_many_arguments)]
    fn build_route(
        compiler: &PatternCompiler,
        method: &str,
        pattern: &str,
        handler: HandlerRef,
        name: Option<String>,
        middleware: Vec<MiddlewareRef>,
        constraints: HashMap<String, String>,
        schema: Option<ParamSchema>,
        group_prefix: String,
    ) -> Route {
        let matcher = compiler.compile(pattern, &constraints);
        Route {
            method: method.trim().to_uppercase(),
            pattern: matcher.template().to_string(),
            matcher,
            handler,
            name,
            middleware,
            constraints,
            schema,
            group_prefix,
        }
    }

    fn apply_defaults(registry: &mut RouteRegistry, compiler: &PatternCompiler) {
        if !registry.any(Route::is_root) {
            tracing::debug!("adding default root route");
            registry.push(Self::default_route(compiler, ROOT_PATTERN));
        }
        if !registry.any(Route::is_catch_all) {
            tracing::debug!("adding default catch-all route");
            registry.push(Self::default_route(compiler, CATCH_ALL_PATTERN));
        }
    }

    fn default_route(compiler: &PatternCompiler, pattern: &str) -> Route {
        Self::build_route(
            compiler,
            "GET",
            pattern,
            HandlerRef::ContentFallback,
            None,
            Vec::new(),
            HashMap::new(),
            None,
            String::new(),
        )
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Loads persisted routes once, if persistence is enabled.
    fn ensure_loaded(&self) {
        if !self.config.persist_routes || self.loaded.load(Ordering::Acquire) {
            return;
        }
        let Some(table) = self.table.as_ref() else {
            return;
        };

        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        if self.loaded.load(Ordering::Acquire) {
            return;
        }

        let rows = loader::load_rows(table.as_ref());
        let total = rows.len();
        let mut added = 0;
        for definition in rows.iter().filter_map(loader::decode_row) {
            registry.push(self.persisted_route(definition));
            added += 1;
        }
        if added < total {
            tracing::warn!("skipped {} of {} persisted routes", total - added, total);
        }

        Self::apply_defaults(&mut registry, &self.compiler);
        self.cache.clear();
        self.loaded.store(true, Ordering::Release);
        tracing::info!("loaded {} persisted routes", added);
    }

    fn persisted_route(&self, definition: RouteDefinition) -> Route {
        let RouteDefinition {
            method,
            pattern,
            handler,
            options,
        } = definition;
        let PersistedOptions {
            name,
            middleware,
            constraints,
            schema,
            group,
        } = options;

        Self::build_route(
            &self.compiler,
            &method,
            &pattern,
            handler,
            name,
            middleware.into_iter().map(MiddlewareRef::Named).collect(),
            constraints,
            schema,
            group,
        )
    }

    /// Rows for every route that can be persisted.
    ///
    /// Inline handlers are skipped. Inline middleware and custom schema
    /// predicates are dropped from the rows they belong to.
    pub fn export_rows(&self) -> Vec<RouteRow> {
        self.routes()
            .iter()
            .filter_map(|route| {
                let handler = route.handler.to_persisted()?;
                let middleware = route
                    .middleware
                    .iter()
                    .filter_map(|m| {
                        let alias = m.alias();
                        if alias.is_none() {
                            tracing::warn!("inline middleware on {} {} is not persisted", route.method, route.pattern);
                        }
                        alias.map(str::to_string)
                    })
                    .collect();
                let options = PersistedOptions {
                    name: route.name.clone(),
                    middleware,
                    constraints: route.constraints.clone(),
                    schema: route.schema.clone(),
                    group: route.group_prefix.clone(),
                };
                Some(RouteRow::new(&route.method, &route.pattern, handler, options.encode()))
            })
            .collect()
    }

    /// Writes [`export_rows`](Self::export_rows) to the route table.
    pub fn save_routes(&self) -> Result<usize> {
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| TableError::Storage("no route table configured".to_string()))?;
        let rows = self.export_rows();
        table.save(&rows)?;
        Ok(rows.len())
    }

    // ---------------------------------------------------------------------
    // Matching and dispatch
    // ---------------------------------------------------------------------

    /// Registered routes in registration order.
    pub fn routes(&self) -> Vec<Arc<Route>> {
        self.ensure_loaded();
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .routes()
            .to_vec()
    }

    /// Finds the route for a request without validating parameters.
    pub fn find(&self, method: &str, path: &str) -> Option<RouteMatch> {
        self.ensure_loaded();

        let method = method.trim().to_uppercase();
        let path = normalize_path(path);
        let key = MatchCache::key(&method, &path);

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("match cache hit for {}", key);
            return cached;
        }

        let result = self.find_uncached(&method, &path);
        match &result {
            Some(found) => tracing::debug!("{} matched {} ({:?})", key, found.route.pattern, found.origin),
            None => tracing::debug!("{} matched nothing", key),
        }
        self.cache.insert(key, result.clone());
        result
    }

    fn find_uncached(&self, method: &str, path: &str) -> Option<RouteMatch> {
        {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            for route in registry.routes() {
                if !route.allows(method) {
                    continue;
                }
                if let Some(params) = route.match_path(path) {
                    return Some(RouteMatch {
                        route: route.clone(),
                        params,
                        origin: MatchOrigin::Registry,
                    });
                }
            }
        }

        if path == "/" {
            return Some(RouteMatch {
                route: Arc::new(Self::transient_home(method)),
                params: Params::new(),
                origin: MatchOrigin::Home,
            });
        }

        if method != "GET" {
            return None;
        }

        resolve_fallback(self.content.as_ref(), path, &self.config.home).map(|(route, params)| RouteMatch {
            route,
            params,
            origin: MatchOrigin::Content,
        })
    }

    fn transient_home(method: &str) -> Route {
        let matcher = Arc::new(CompiledPattern::literal(ROOT_PATTERN));
        Route {
            method: method.to_string(),
            pattern: matcher.template().to_string(),
            matcher,
            handler: HandlerRef::ContentFallback,
            name: None,
            middleware: Vec::new(),
            constraints: HashMap::new(),
            schema: None,
            group_prefix: String::new(),
        }
    }

    /// Matches a request and validates its parameters.
    ///
    /// The returned parameters have schema defaults applied.
    pub fn match_route(&self, method: &str, path: &str) -> Result<RouteMatch> {
        let mut found = self.find(method, path).ok_or_else(|| RouterError::RouteNotFound {
            method: method.trim().to_uppercase(),
            path: normalize_path(path),
        })?;

        if let Some(schema) = &found.route.schema {
            found.params = validate(&found.params, schema)?;
        }
        Ok(found)
    }

    /// Matches and runs a request through global, route and handler layers.
    pub fn dispatch(&self, request: &Request) -> Result<Dispatch> {
        let RouteMatch { route, params, .. } = self.match_route(&request.method, &request.path)?;

        let refs: Vec<MiddlewareRef> = self
            .global_middleware
            .iter()
            .chain(route.middleware.iter())
            .cloned()
            .collect();
        let layers = resolve_middleware(&refs, &self.aliases)?;

        let content_path = content_identifier(&request.path, &self.config.home);
        let resolver = self.resolver.as_ref();
        let handler = &route.handler;

        let pipeline = build_pipeline(&layers, |request: &Request, params: &Params| {
            execute(handler, resolver, &content_path, request, params)
        });
        pipeline.run(request, &params)
    }

    /// Builds the URL of a named route.
    ///
    /// With `absolute`, the configured base URL is prepended.
    pub fn generate_url(&self, name: &str, params: &Params, absolute: bool) -> Result<String> {
        self.ensure_loaded();
        let route = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            registry
                .by_name(name)
                .cloned()
                .ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))?
        };

        let path = reverse::generate(name, &route, params)?;
        Ok(if absolute {
            reverse::absolute(&self.config.base_url, &path)
        } else {
            path
        })
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let routes = self.registry.read().map(|r| r.len()).unwrap_or_default();
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("routes", &routes)
            .field("cached_matches", &self.cache.len())
            .field("aliases", &self.aliases.keys().collect::<Vec<_>>())
            .finish()
    }
}
