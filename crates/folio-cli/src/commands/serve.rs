// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP server command.

use std::path::Path;

use console::style;

use crate::config::Config;
use crate::server;

/// Serves the project in the current directory.
///
/// `host` and `port` override the `[server]` section of `folio.toml`.
pub async fn run(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let root = std::env::current_dir()?;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let state = server::build(&config, &root)?;
    print_banner(&config, &root, &addr, state.router.routes().len());

    server::serve(&addr, state).await
}

fn print_banner(config: &Config, root: &Path, addr: &str, routes: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("folio").cyan().bold(),
        config.project.name,
        config.project.version
    );
    println!("  Content: {}", config.content_dir(root).display());
    if config.routing.persist_routes {
        println!("  Routes:  {} (persisted in {})", routes, config.data_dir(root).display());
    } else {
        println!("  Routes:  {}", routes);
    }
    println!();
    println!("  {} http://{}", style("➜").green().bold(), addr);
    println!();
}
