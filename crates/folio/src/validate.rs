// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Path parameter validation.
//!
//! A route may carry a [`ParamSchema`]: one [`Rule`] per parameter name.
//! Rules are checked after a structural match. The first failing rule
//! rejects the whole match with [`RouterError::InvalidParameter`].
//!
//! Schemas deserialize from the JSON options of persisted routes:
//!
//! ```json
//! {
//!   "schema": {
//!     "id":   { "type": "integer", "min": 1 },
//!     "sort": { "enum": ["asc", "desc"], "required": false, "default": "asc" }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouterError};
use crate::pattern::Params;

lazy_static! {
    static ref DATE_RE: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Rules keyed by parameter name.
pub type ParamSchema = HashMap<String, Rule>;

/// Custom predicate applied to the raw parameter value.
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// The type a parameter value must coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Any string.
    #[default]
    String,
    /// A signed integer.
    Integer,
    /// A finite floating point number.
    Float,
    /// `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`.
    Boolean,
    /// A calendar date, `YYYY-MM-DD`.
    Date,
    /// An email address.
    Email,
    /// An absolute URL.
    Url,
}

/// Validation rule for one parameter.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    /// Type the value must coerce to.
    #[serde(rename = "type")]
    pub kind: ParamType,
    /// Whether the parameter must be present (default: true).
    pub required: bool,
    /// Value used when an optional parameter is absent.
    pub default: Option<String>,
    /// Numeric lower bound (integer and float only).
    pub min: Option<f64>,
    /// Numeric upper bound (integer and float only).
    pub max: Option<f64>,
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
    /// Regex the whole value must match.
    pub pattern: Option<RulePattern>,
    /// Allowed values.
    #[serde(rename = "enum")]
    pub allowed: Option<Vec<String>>,
    /// Custom predicate. Not persisted.
    #[serde(skip)]
    pub custom: Option<Predicate>,
}

/// A `pattern` rule, compiled once when the rule is built or deserialized.
///
/// Serializes as the plain source string.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RulePattern {
    source: String,
    regex: Option<Regex>,
}

impl RulePattern {
    /// Compiles `source`, anchored at both ends. An invalid expression is
    /// kept and fails every value it is checked against.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let regex = match Regex::new(&format!("^(?:{})$", source)) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::warn!("invalid pattern rule `{}`: {}", source, e);
                None
            }
        };
        Self { source, regex }
    }

    /// The expression as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns true if the expression compiled.
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }
}

impl From<String> for RulePattern {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<RulePattern> for String {
    fn from(pattern: RulePattern) -> Self {
        pattern.source
    }
}

impl fmt::Debug for RulePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.source)
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            kind: ParamType::String,
            required: true,
            default: None,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            pattern: None,
            allowed: None,
            custom: None,
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern)
            .field("allowed", &self.allowed)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

impl Rule {
    /// A required rule of the given type.
    pub fn of(kind: ParamType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Makes the parameter optional, falling back to `default` when absent.
    pub fn optional(mut self, default: Option<&str>) -> Self {
        self.required = false;
        self.default = default.map(str::to_string);
        self
    }

    /// Sets numeric bounds.
    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Sets length bounds.
    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// Requires the value to match `pattern` in full.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(RulePattern::new(pattern));
        self
    }

    /// Restricts the value to a fixed set.
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a custom predicate.
    pub fn check<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(predicate));
        self
    }

    fn apply(&self, name: &str, value: &str) -> std::result::Result<(), String> {
        let number = match self.kind {
            ParamType::String => None,
            ParamType::Integer => Some(
                value
                    .parse::<i64>()
                    .map(|n| n as f64)
                    .map_err(|_| "must be an integer".to_string())?,
            ),
            ParamType::Float => Some(
                value
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| "must be a number".to_string())?,
            ),
            ParamType::Boolean => {
                parse_bool(value).ok_or_else(|| "must be a boolean".to_string())?;
                None
            }
            ParamType::Date => {
                if !is_date(value) {
                    return Err("must be a date (YYYY-MM-DD)".to_string());
                }
                None
            }
            ParamType::Email => {
                if !EMAIL_RE.is_match(value) {
                    return Err("must be an email address".to_string());
                }
                None
            }
            ParamType::Url => {
                url::Url::parse(value).map_err(|_| "must be a URL".to_string())?;
                None
            }
        };

        if let Some(n) = number {
            if let Some(min) = self.min {
                if n < min {
                    return Err(format!("must be at least {}", min));
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    return Err(format!("must be at most {}", max));
                }
            }
        }

        let length = value.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                return Err(format!("must be at least {} characters", min));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return Err(format!("must be at most {} characters", max));
            }
        }

        if let Some(pattern) = &self.pattern {
            let regex = pattern.regex.as_ref().ok_or_else(|| {
                tracing::warn!("invalid pattern rule for `{}`: {}", name, pattern.source);
                "has an invalid pattern rule".to_string()
            })?;
            if !regex.is_match(value) {
                return Err(format!("must match {}", pattern.source));
            }
        }

        if let Some(allowed) = &self.allowed {
            if !allowed.iter().any(|a| a == value) {
                return Err(format!("must be one of: {}", allowed.join(", ")));
            }
        }

        if let Some(custom) = &self.custom {
            if !custom(value) {
                return Err("failed custom validation".to_string());
            }
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn is_date(value: &str) -> bool {
    let Some(caps) = DATE_RE.captures(value) else {
        return false;
    };
    let field = |i: usize| caps[i].parse::<u32>().unwrap_or(0);
    let (year, month, day) = (field(1), field(2), field(3));

    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days).contains(&day)
}

/// Validates captured parameters against a schema.
///
/// Returns the parameters with defaults filled in for absent optional
/// parameters. Parameters not named in the schema pass through unchecked.
/// Rules are evaluated in parameter-name order so the reported failure is
/// deterministic.
pub fn validate(params: &Params, schema: &ParamSchema) -> Result<Params> {
    let mut validated = params.clone();

    let mut names: Vec<&String> = schema.keys().collect();
    names.sort();

    for name in names {
        let rule = &schema[name];
        match params.get(name).filter(|v| !v.is_empty()) {
            Some(value) => rule.apply(name, value).map_err(|reason| RouterError::InvalidParameter {
                name: name.clone(),
                reason,
            })?,
            None => {
                if let Some(default) = &rule.default {
                    validated.insert(name.clone(), default.clone());
                } else if rule.required {
                    return Err(RouterError::InvalidParameter {
                        name: name.clone(),
                        reason: "is required".to_string(),
                    });
                }
            }
        }
    }

    Ok(validated)
}
