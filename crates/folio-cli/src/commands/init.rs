// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Project initialization command for creating new folio projects.

use std::fs;
use std::path::{Path, PathBuf};

use console::style;
use folio::RouteTable;

use crate::components::seed_rows;
use crate::config::{Config, CONFIG_FILE};
use crate::store::SqliteRouteTable;

const HOME_PAGE: &str = "# Welcome\n\nThis page lives in `content/home.md`.\n";

/// Initializes a new folio project.
pub fn run(name: Option<String>) -> anyhow::Result<()> {
    let (project_dir, project_name) = resolve_project_path(name)?;
    let seeded = init_project(&project_dir, &project_name)?;
    print_success(&project_dir, &project_name, seeded);
    Ok(())
}

/// Writes `folio.toml`, the content directory and the route table.
///
/// Returns the number of seeded routes. Fails if the directory already
/// holds a `folio.toml`.
pub fn init_project(project_dir: &Path, project_name: &str) -> anyhow::Result<usize> {
    let config_path = project_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    fs::create_dir_all(project_dir)?;

    let mut config = Config::unnamed();
    config.project.name = project_name.to_string();
    config.routing.persist_routes = true;
    config.routing.base_url = format!("http://{}:{}", config.server.host, config.server.port);
    fs::write(&config_path, toml::to_string_pretty(&config)?)?;
    tracing::info!("wrote {}", config_path.display());

    let content_dir = config.content_dir(project_dir);
    fs::create_dir_all(&content_dir)?;
    let home = content_dir.join(format!("{}.{}", config.routing.home, config.content.extension));
    if !home.exists() {
        fs::write(&home, HOME_PAGE)?;
    }

    let table = SqliteRouteTable::open(&config.data_dir(project_dir))?;
    let rows = seed_rows();
    table.reinitialize()?;
    table.save(&rows)?;

    Ok(rows.len())
}

fn resolve_project_path(name: Option<String>) -> anyhow::Result<(PathBuf, String)> {
    match name.as_deref() {
        Some(".") | None => {
            let current_dir = std::env::current_dir()?;
            let dir_name = current_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "my-folio-site".to_string());
            Ok((current_dir, dir_name))
        }
        Some(name) => {
            let project_path = PathBuf::from(name);
            let dir_name = project_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.to_string());
            Ok((project_path, dir_name))
        }
    }
}

fn print_success(project_dir: &Path, project_name: &str, seeded: usize) {
    println!();
    println!(
        "{} Created folio project {}",
        style("✓").green().bold(),
        style(project_name).cyan().bold()
    );
    println!("  Seeded {} route(s)", seeded);
    println!();
    println!("Next steps:");
    println!("  cd {}", project_dir.display());
    println!("  folio serve");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::{Request, Router};
    use std::sync::Arc;

    #[test]
    fn test_init_writes_project() {
        let dir = tempfile::tempdir().unwrap();
        let seeded = init_project(dir.path(), "site").unwrap();
        assert_eq!(seeded, 4);

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.project.name, "site");
        assert!(config.routing.persist_routes);
        assert!(dir.path().join("content/home.md").is_file());

        let table = SqliteRouteTable::open(&config.data_dir(dir.path())).unwrap();
        assert_eq!(table.load().unwrap(), seed_rows());
    }

    #[test]
    fn test_init_refuses_existing_project() {
        let dir = tempfile::tempdir().unwrap();
        init_project(dir.path(), "site").unwrap();
        assert!(init_project(dir.path(), "site").is_err());
    }

    #[test]
    fn test_seeded_routes_load_in_order() {
        let dir = tempfile::tempdir().unwrap();
        init_project(dir.path(), "site").unwrap();
        let config = Config::load_from(dir.path()).unwrap();

        let table = Arc::new(SqliteRouteTable::open(&config.data_dir(dir.path())).unwrap());
        let router = Router::new(config.routing.clone()).with_table(table);
        let found = router.match_route("GET", "/health").unwrap();
        assert_eq!(found.route.name.as_deref(), Some("health"));
        assert!(router.dispatch(&Request::new("GET", "/")).is_ok());
    }
}
