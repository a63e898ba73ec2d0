// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use folio_cli::commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Router and server for flat-file content sites", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new folio project
    Init {
        /// Project directory (defaults to the current directory)
        name: Option<String>,
    },
    /// Serve the project over HTTP
    Serve {
        /// Port to run the server on (defaults to folio.toml)
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to (defaults to folio.toml)
        #[arg(long)]
        host: Option<String>,
    },
    /// Print the route table and content
    Routes,
    /// Show which route a request would hit
    Match {
        /// HTTP method
        method: String,
        /// Request path
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let filter = EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    match cli.command {
        Commands::Init { name } => commands::init::run(name),
        Commands::Serve { port, host } => commands::serve::run(host, port).await,
        Commands::Routes => commands::routes::run(),
        Commands::Match { method, path } => commands::match_route::run(&method, &path),
    }
}
