// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Folio project configuration.
//!
//! Configuration is loaded from `folio.toml` at the project root.
//!
//! # Example Configuration
//!
//! ```toml
//! [project]
//! name = "my-site"
//! version = "1.0.0"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [routing]
//! persist_routes = true
//! home = "home"
//! base_url = "http://localhost:3000"
//! matcher = "regex"
//!
//! [content]
//! content_dir = "content"
//! data_dir = ".folio/data"
//! extension = "md"
//! ```

use folio::RouterConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "folio.toml";

/// Main configuration structure loaded from `folio.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project metadata (name, version).
    pub project: ProjectConfig,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Router settings.
    #[serde(default)]
    pub routing: RouterConfig,
    /// Content locations.
    #[serde(default)]
    pub content: ContentConfig,
}

/// Project metadata configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name.
    pub name: String,
    /// Project version (default: "0.1.0").
    #[serde(default = "default_version")]
    pub version: String,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host (default: "127.0.0.1").
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (default: 3000).
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Content and data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Directory holding content files (default: "content").
    #[serde(default = "default_content_dir")]
    pub content_dir: String,
    /// Directory for the route database (default: ".folio/data").
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Content file extension without the dot (default: "md").
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_content_dir() -> String {
    "content".to_string()
}

fn default_data_dir() -> String {
    ".folio/data".to_string()
}

fn default_extension() -> String {
    "md".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            data_dir: default_data_dir(),
            extension: default_extension(),
        }
    }
}

impl Config {
    /// Configuration used when no `folio.toml` exists.
    pub fn unnamed() -> Self {
        Config {
            project: ProjectConfig {
                name: "unnamed".to_string(),
                version: default_version(),
            },
            server: ServerConfig::default(),
            routing: RouterConfig::default(),
            content: ContentConfig::default(),
        }
    }

    /// Loads configuration from `folio.toml` in the current directory.
    ///
    /// If no configuration file exists, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be parsed.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Loads configuration from `folio.toml` in `root`.
    pub fn load_from(root: &Path) -> anyhow::Result<Self> {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::unnamed());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Content directory resolved against `root`.
    pub fn content_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.content.content_dir)
    }

    /// Data directory resolved against `root`.
    pub fn data_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.content.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio::MatcherEngine;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.project.name, "unnamed");
        assert_eq!(config.server.port, 3000);
        assert!(!config.routing.persist_routes);
        assert_eq!(config.content.extension, "md");
    }

    #[test]
    fn test_parse_full_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
[project]
name = "site"

[server]
port = 8080

[routing]
persist_routes = true
matcher = "segment"

[content]
content_dir = "pages"
"#,
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.project.name, "site");
        assert_eq!(config.project.version, "0.1.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.routing.persist_routes);
        assert_eq!(config.routing.matcher, MatcherEngine::Segment);
        assert_eq!(config.routing.home, "home");
        assert_eq!(config.content_dir(dir.path()), dir.path().join("pages"));
        assert_eq!(config.content.data_dir, ".folio/data");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[project\nname = ").unwrap();
        assert!(Config::load_from(dir.path()).is_err());
    }
}
