// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Route listing command.

use std::fmt::Write as _;
use std::path::Path;

use console::style;

use crate::components::{summarize, RouteSummary};
use crate::config::Config;
use crate::server;

/// Prints the route table and the content identifiers of the project in
/// the current directory.
pub fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    let root = std::env::current_dir()?;
    print!("{}", render(&config, &root)?);
    Ok(())
}

/// Renders the listing as text.
pub fn render(config: &Config, root: &Path) -> anyhow::Result<String> {
    let state = server::build(config, root)?;
    let routes = summarize(&state.router);
    let content = state.content.identifiers();

    let mut out = String::new();
    writeln!(out, "{}", style(format!("Routes ({})", routes.len())).bold())?;
    write_table(&mut out, &routes)?;
    writeln!(out)?;
    writeln!(out, "{}", style(format!("Content ({})", content.len())).bold())?;
    for identifier in &content {
        writeln!(out, "  {}", identifier)?;
    }
    Ok(out)
}

fn write_table(out: &mut String, routes: &[RouteSummary]) -> std::fmt::Result {
    let width = routes.iter().map(|r| r.pattern.len()).max().unwrap_or(0);
    for route in routes {
        write!(
            out,
            "  {:<7} {:<width$}  {}",
            style(&route.method).green(),
            route.pattern,
            route.handler,
            width = width
        )?;
        if let Some(name) = &route.name {
            write!(out, "  {}", style(format!("({})", name)).dim())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_routes_and_content() {
        console::set_colors_enabled(false);
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("content/blog")).unwrap();
        std::fs::write(dir.path().join("content/about.md"), "# About").unwrap();
        std::fs::write(dir.path().join("content/blog/first.md"), "# First").unwrap();

        let text = render(&Config::unnamed(), dir.path()).unwrap();
        assert!(text.contains("Routes (4)"));
        assert!(text.contains("system@health"));
        assert!(text.contains("(health)"));
        assert!(text.contains("/{path:.+}"));
        assert!(text.contains("Content (2)"));
        assert!(text.contains("blog/first"));
    }
}
