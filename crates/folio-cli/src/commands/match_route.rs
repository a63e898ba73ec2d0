// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Route matching command.

use console::style;
use folio::{MatchOrigin, Router};

use crate::config::Config;
use crate::server;

/// Prints which route `METHOD PATH` would hit in the current project.
pub fn run(method: &str, path: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let root = std::env::current_dir()?;
    let state = server::build(&config, &root)?;
    println!("{}", describe(&state.router, method, path));
    Ok(())
}

/// Describes the outcome of matching `method path`.
pub fn describe(router: &Router, method: &str, path: &str) -> String {
    let method = method.to_ascii_uppercase();
    match router.match_route(&method, path) {
        Ok(found) => {
            let origin = match found.origin {
                MatchOrigin::Registry => "route",
                MatchOrigin::Home => "implicit home",
                MatchOrigin::Content => "content",
            };
            let mut lines = vec![format!(
                "{} {} {} -> {} {} [{}]",
                style("✓").green().bold(),
                method,
                path,
                found.route.method,
                found.route.pattern,
                origin
            )];
            lines.push(format!("  handler: {}", found.route.handler));
            if let Some(name) = &found.route.name {
                lines.push(format!("  name:    {}", name));
            }
            let mut params: Vec<_> = found.params.iter().collect();
            params.sort();
            for (key, value) in params {
                lines.push(format!("  {} = {}", key, value));
            }
            lines.join("\n")
        }
        Err(e) => format!("{} {} ({})", style("✗").red().bold(), e, e.status()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::{HandlerRef, MemoryContentStore, ParamSchema, ParamType, RouteOptions, RouterConfig, Rule};
    use std::sync::Arc;

    fn router() -> Router {
        let mut router = Router::new(RouterConfig::default())
            .with_content_store(Arc::new(MemoryContentStore::with(["about"])));
        let schema: ParamSchema = [("id".to_string(), Rule::of(ParamType::Integer))].into();
        router.add_route(
            "GET",
            "/posts/{id}",
            HandlerRef::bound("post", "show"),
            RouteOptions::new().named("post.show").schema(schema),
        );
        router
    }

    #[test]
    fn test_describe_registered_route() {
        console::set_colors_enabled(false);
        let text = describe(&router(), "get", "/posts/42");
        assert!(text.contains("GET /posts/{id} [route]"));
        assert!(text.contains("post@show"));
        assert!(text.contains("id = 42"));
    }

    #[test]
    fn test_describe_content_and_failures() {
        console::set_colors_enabled(false);
        let router = router();
        assert!(describe(&router, "GET", "/about").contains("[content]"));
        assert!(describe(&router, "GET", "/posts/abc").contains("(400)"));
        assert!(describe(&router, "GET", "/missing").contains("(404)"));
    }
}
