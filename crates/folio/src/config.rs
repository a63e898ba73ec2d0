// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Router configuration.
//!
//! Deserializable so hosts can embed it in their own config files:
//!
//! ```toml
//! persist_routes = true
//! home = "home"
//! base_url = "https://example.com"
//! matcher = "segment"
//! ```

use serde::{Deserialize, Serialize};

use crate::pattern::MatcherEngine;

/// Router settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Load routes from the route table on first use (default: false).
    #[serde(default)]
    pub persist_routes: bool,

    /// Content identifier used for `/` (default: "home").
    #[serde(default = "default_home")]
    pub home: String,

    /// Scheme and host prepended to absolute URLs (default: "http://localhost").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Engine used for plain templates (default: regex).
    #[serde(default)]
    pub matcher: MatcherEngine,
}

fn default_home() -> String {
    "home".to_string()
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            persist_routes: false,
            home: default_home(),
            base_url: default_base_url(),
            matcher: MatcherEngine::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: RouterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.home, "home");
        assert_eq!(config.matcher, MatcherEngine::Regex);
    }

    #[test]
    fn test_matcher_engine_names() {
        let config: RouterConfig = serde_json::from_str(r#"{"matcher":"segment","persist_routes":true}"#).unwrap();
        assert_eq!(config.matcher, MatcherEngine::Segment);
        assert!(config.persist_routes);
    }
}
