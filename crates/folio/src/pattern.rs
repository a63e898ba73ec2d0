// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Path template compilation.
//!
//! A path template is a normalized path with placeholders:
//!
//! - `{name}` → one or more non-slash characters (`[^/]+`)
//! - `{name:regex}` → the given sub-pattern (e.g. `{id:[0-9]+}`)
//!
//! Per-route overrides (the `where` constraints of a route) replace the
//! sub-pattern of the placeholder with the same name.
//!
//! # Complexity guard
//!
//! A sub-pattern with more than [`MAX_QUANTIFIERS`] `*`/`+` characters, or
//! one that does not compile, is replaced by [`DEFAULT_SEGMENT_PATTERN`] and
//! a warning is logged. Compilation itself never fails.
//!
//! # Engines
//!
//! [`CompiledPattern`] hides the matching engine behind [`PathMatcher`].
//! The regex engine handles every template; the segment engine (backed by
//! `matchit`) is used only for templates whose placeholders are plain
//! whole segments, when [`MatcherEngine::Segment`] is configured.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Captured path parameters, name → decoded value.
pub type Params = HashMap<String, String>;

/// Sub-pattern used for placeholders without an explicit or safe one.
pub const DEFAULT_SEGMENT_PATTERN: &str = "[^/]+";

/// Maximum number of `*`/`+` characters allowed in a sub-pattern.
pub const MAX_QUANTIFIERS: usize = 5;

/// Normalizes a request path.
///
/// Trims whitespace, collapses repeated slashes, drops the trailing slash
/// and guarantees exactly one leading slash. The empty path becomes `/`.
/// Normalizing twice is the same as normalizing once.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .trim()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, matched verbatim.
    Literal(String),
    /// A named placeholder with an optional inline sub-pattern.
    Placeholder {
        /// Parameter name.
        name: String,
        /// Inline sub-pattern from `{name:pattern}`.
        pattern: Option<String>,
    },
}

/// Parses a template into literal and placeholder segments.
///
/// Literal text is slash-normalized; sub-patterns are kept untouched, so
/// `{year:[0-9]{4}}` keeps its inner braces. An unterminated `{` is
/// treated as literal text.
pub fn parse_template(template: &str) -> Vec<Segment> {
    let chars: Vec<char> = template.trim().chars().collect();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '{' {
            if let Some(end) = find_closing_brace(&chars, i) {
                let inner: String = chars[i + 1..end].iter().collect();
                let (name, pattern) = match inner.split_once(':') {
                    Some((name, pattern)) => {
                        let pattern = pattern.trim();
                        (name.trim(), (!pattern.is_empty()).then(|| pattern.to_string()))
                    }
                    None => (inner.trim(), None),
                };

                if !name.is_empty() {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder {
                        name: name.to_string(),
                        pattern,
                    });
                    i = end + 1;
                    continue;
                }
            }
        }
        literal.push(chars[i]);
        i += 1;
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    normalize_segments(segments)
}

/// Finds the `}` closing the `{` at `open`, honoring nesting and escapes.
///
/// Character classes are opaque: the brace in `{id:[^}]+}` does not close
/// the placeholder.
fn find_closing_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut j = open;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 1,
            ']' if in_class => in_class = false,
            _ if in_class => {}
            '[' => {
                in_class = true;
                // A leading `]` (after an optional `^`) is a class member.
                if chars.get(j + 1) == Some(&'^') {
                    j += 1;
                }
                if chars.get(j + 1) == Some(&']') {
                    j += 1;
                }
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
        j += 1;
    }
    None
}

/// Applies path normalization to the literal parts of a template.
fn normalize_segments(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len() + 1);

    for segment in segments {
        match segment {
            Segment::Literal(text) => {
                let mut collapsed = String::with_capacity(text.len());
                for c in text.chars() {
                    if c == '/' && collapsed.ends_with('/') {
                        continue;
                    }
                    collapsed.push(c);
                }
                out.push(Segment::Literal(collapsed));
            }
            placeholder => out.push(placeholder),
        }
    }

    let leading_literal = match out.first() {
        Some(Segment::Literal(text)) => Some(text.starts_with('/')),
        _ => None,
    };
    match leading_literal {
        Some(true) => {}
        Some(false) => {
            if let Some(Segment::Literal(text)) = out.first_mut() {
                text.insert(0, '/');
            }
        }
        None => out.insert(0, Segment::Literal("/".to_string())),
    }

    let single = out.len() == 1;
    let mut drop_last = false;
    if let Some(Segment::Literal(text)) = out.last_mut() {
        while text.len() > 1 && text.ends_with('/') {
            text.pop();
        }
        drop_last = text.as_str() == "/" && !single;
    }
    if drop_last {
        out.pop();
    }

    out
}

/// Renders segments back into template text.
fn render_template(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text.clone(),
            Segment::Placeholder { name, pattern: Some(p) } => format!("{{{}:{}}}", name, p),
            Segment::Placeholder { name, pattern: None } => format!("{{{}}}", name),
        })
        .collect()
}

/// Matches a normalized path and extracts parameters.
///
/// Implementations must be pure: the same path always yields the same result.
pub trait PathMatcher: Send + Sync + fmt::Debug {
    /// Returns the captured parameters, or `None` when the path does not match.
    fn match_path(&self, path: &str) -> Option<Params>;
}

pub(crate) fn decode_param(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Regex-backed matcher.
///
/// Capture groups are named `p0`, `p1`, … so any placeholder name is
/// accepted; `names` maps them back.
#[derive(Debug)]
pub struct RegexMatcher {
    regex: Regex,
    names: Vec<(String, String)>,
}

impl PathMatcher for RegexMatcher {
    fn match_path(&self, path: &str) -> Option<Params> {
        let captures = self.regex.captures(path)?;
        Some(
            self.names
                .iter()
                .filter_map(|(group, name)| {
                    captures
                        .name(group)
                        .map(|m| (name.clone(), decode_param(m.as_str())))
                })
                .collect(),
        )
    }
}

/// Whole-segment matcher backed by `matchit`.
pub struct SegmentMatcher {
    template: String,
    inner: matchit::Router<()>,
}

impl SegmentMatcher {
    /// Builds a segment matcher, or `None` if `matchit` rejects the template.
    fn new(template: &str) -> Option<Self> {
        let mut inner = matchit::Router::new();
        match inner.insert(template, ()) {
            Ok(()) => Some(Self {
                template: template.to_string(),
                inner,
            }),
            Err(e) => {
                tracing::debug!("segment engine rejected {}: {}", template, e);
                None
            }
        }
    }

    /// True when every placeholder is a plain, whole path segment.
    fn supports(segments: &[Segment], overrides: &HashMap<String, String>) -> bool {
        segments.iter().enumerate().all(|(i, segment)| match segment {
            Segment::Literal(text) => !text.contains(['{', '}', '*']),
            Segment::Placeholder { name, pattern } => {
                let starts_segment = matches!(
                    i.checked_sub(1).and_then(|p| segments.get(p)),
                    Some(Segment::Literal(text)) if text.ends_with('/')
                );
                let ends_segment = match segments.get(i + 1) {
                    None => true,
                    Some(Segment::Literal(text)) => text.starts_with('/'),
                    Some(Segment::Placeholder { .. }) => false,
                };
                pattern.is_none() && !overrides.contains_key(name) && starts_segment && ends_segment
            }
        })
    }
}

impl fmt::Debug for SegmentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentMatcher")
            .field("template", &self.template)
            .finish()
    }
}

impl PathMatcher for SegmentMatcher {
    fn match_path(&self, path: &str) -> Option<Params> {
        let matched = self.inner.at(path).ok()?;
        Some(
            matched
                .params
                .iter()
                .map(|(k, v)| (k.to_string(), decode_param(v)))
                .collect(),
        )
    }
}

/// Matches exactly one normalized path. Used for transient routes.
#[derive(Debug)]
struct ExactMatcher {
    path: String,
}

impl PathMatcher for ExactMatcher {
    fn match_path(&self, path: &str) -> Option<Params> {
        (path == self.path).then(Params::new)
    }
}

/// Never matches. Only reachable if even the all-default regex fails to build.
#[derive(Debug)]
struct NeverMatcher;

impl PathMatcher for NeverMatcher {
    fn match_path(&self, _path: &str) -> Option<Params> {
        None
    }
}

/// Which engine compiles plain templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherEngine {
    /// Regex for every template.
    #[default]
    Regex,
    /// `matchit` for plain templates, regex for the rest.
    Segment,
}

/// A compiled path template.
#[derive(Debug)]
pub struct CompiledPattern {
    template: String,
    segments: Vec<Segment>,
    matcher: Box<dyn PathMatcher>,
    downgraded: Vec<String>,
    catch_all: bool,
    value_checks: HashMap<String, Regex>,
}

impl CompiledPattern {
    /// Compiles a template with per-placeholder sub-pattern overrides.
    pub fn compile(template: &str, overrides: &HashMap<String, String>, engine: MatcherEngine) -> Self {
        let segments = parse_template(template);
        let rendered = render_template(&segments);

        let mut downgraded = Vec::new();
        let effective: Vec<Option<String>> = segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(_) => None,
                Segment::Placeholder { name, pattern } => {
                    let requested = overrides.get(name).or(pattern.as_ref());
                    Some(effective_pattern(&rendered, name, requested, &mut downgraded))
                }
            })
            .collect();

        let mut value_checks = value_checks(&segments, &effective);

        let catch_all = matches!(
            (segments.as_slice(), effective.as_slice()),
            ([Segment::Literal(root), Segment::Placeholder { .. }], [None, Some(p)])
                if root == "/" && (p == ".+" || p == ".*")
        );

        let segment_matcher = if engine == MatcherEngine::Segment
            && SegmentMatcher::supports(&segments, overrides)
        {
            SegmentMatcher::new(&rendered)
        } else {
            None
        };

        let matcher: Box<dyn PathMatcher> = match segment_matcher {
            Some(matcher) => Box::new(matcher),
            None => match build_regex(&rendered, &segments, &effective) {
                Some(matcher) => Box::new(matcher),
                None => {
                    tracing::warn!(
                        "pattern {} does not compile; falling back to default sub-patterns",
                        rendered
                    );
                    for segment in &segments {
                        if let Segment::Placeholder { name, .. } = segment {
                            if !downgraded.contains(name) {
                                downgraded.push(name.clone());
                            }
                        }
                    }
                    value_checks.clear();
                    let defaults: Vec<Option<String>> = effective
                        .iter()
                        .map(|e| e.as_ref().map(|_| DEFAULT_SEGMENT_PATTERN.to_string()))
                        .collect();
                    match build_regex(&rendered, &segments, &defaults) {
                        Some(matcher) => Box::new(matcher),
                        None => {
                            tracing::error!("pattern {} cannot be matched", rendered);
                            Box::new(NeverMatcher)
                        }
                    }
                }
            },
        };

        Self {
            template: rendered,
            segments,
            matcher,
            downgraded,
            catch_all,
            value_checks,
        }
    }

    /// A pattern matching exactly one normalized path.
    pub fn literal(path: &str) -> Self {
        let path = normalize_path(path);
        Self {
            template: path.clone(),
            segments: vec![Segment::Literal(path.clone())],
            matcher: Box::new(ExactMatcher { path }),
            downgraded: Vec::new(),
            catch_all: false,
            value_checks: HashMap::new(),
        }
    }

    /// The normalized template text, used for reverse URL generation.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The parsed template segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Placeholders whose sub-pattern was replaced by the default.
    pub fn downgraded(&self) -> &[String] {
        &self.downgraded
    }

    /// True for `/{name:.+}`-shaped templates that match every non-root path.
    pub fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    /// True if `value` contains a slash and the sub-pattern of placeholder
    /// `name` accepts it whole, so the slash belongs in a generated URL.
    pub fn keeps_slashes(&self, name: &str, value: &str) -> bool {
        value.contains('/')
            && self
                .value_checks
                .get(name)
                .is_some_and(|regex| regex.is_match(value))
    }

    /// Matches a normalized path.
    pub fn match_path(&self, path: &str) -> Option<Params> {
        self.matcher.match_path(path)
    }
}

/// Picks the sub-pattern for one placeholder, downgrading unsafe ones.
fn effective_pattern(
    template: &str,
    name: &str,
    requested: Option<&String>,
    downgraded: &mut Vec<String>,
) -> String {
    let Some(pattern) = requested else {
        return DEFAULT_SEGMENT_PATTERN.to_string();
    };

    let quantifiers = pattern.chars().filter(|c| matches!(c, '*' | '+')).count();
    if quantifiers > MAX_QUANTIFIERS {
        tracing::warn!(
            "sub-pattern for `{}` in {} has {} quantifiers (max {}); using {}",
            name,
            template,
            quantifiers,
            MAX_QUANTIFIERS,
            DEFAULT_SEGMENT_PATTERN
        );
        downgraded.push(name.to_string());
        return DEFAULT_SEGMENT_PATTERN.to_string();
    }

    if let Err(e) = Regex::new(&format!("^(?:{})$", pattern)) {
        tracing::warn!(
            "sub-pattern for `{}` in {} is invalid ({}); using {}",
            name,
            template,
            e,
            DEFAULT_SEGMENT_PATTERN
        );
        downgraded.push(name.to_string());
        return DEFAULT_SEGMENT_PATTERN.to_string();
    }

    pattern.clone()
}

/// Anchored sub-patterns of placeholders that do not use the default.
fn value_checks(segments: &[Segment], effective: &[Option<String>]) -> HashMap<String, Regex> {
    let mut checks = HashMap::new();
    for (segment, sub) in segments.iter().zip(effective) {
        if let (Segment::Placeholder { name, .. }, Some(sub)) = (segment, sub) {
            if sub == DEFAULT_SEGMENT_PATTERN || checks.contains_key(name) {
                continue;
            }
            if let Ok(regex) = Regex::new(&format!("^(?:{})$", sub)) {
                checks.insert(name.clone(), regex);
            }
        }
    }
    checks
}

fn build_regex(template: &str, segments: &[Segment], effective: &[Option<String>]) -> Option<RegexMatcher> {
    let mut source = String::from("^");
    let mut names = Vec::new();
    let mut seen = HashSet::new();

    for (segment, sub) in segments.iter().zip(effective) {
        match (segment, sub) {
            (Segment::Literal(text), _) => source.push_str(&regex::escape(text)),
            (Segment::Placeholder { name, .. }, Some(sub)) => {
                if seen.insert(name.as_str()) {
                    let group = format!("p{}", names.len());
                    source.push_str(&format!("(?P<{}>{})", group, sub));
                    names.push((group, name.clone()));
                } else {
                    tracing::warn!("placeholder `{}` repeats in {}; only the first is captured", name, template);
                    source.push_str(&format!("(?:{})", sub));
                }
            }
            (Segment::Placeholder { .. }, None) => source.push_str(DEFAULT_SEGMENT_PATTERN),
        }
    }
    source.push('$');

    Regex::new(&source).ok().map(|regex| RegexMatcher { regex, names })
}

/// Compiles templates and memoizes the result.
///
/// The cache key is the raw template plus the sorted override set, so
/// registering structurally identical routes compiles once.
#[derive(Debug, Default)]
pub struct PatternCompiler {
    engine: MatcherEngine,
    cache: Mutex<HashMap<String, Arc<CompiledPattern>>>,
}

impl PatternCompiler {
    /// Creates a compiler using the given engine for plain templates.
    pub fn new(engine: MatcherEngine) -> Self {
        Self {
            engine,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Compiles (or fetches) a template.
    pub fn compile(&self, template: &str, overrides: &HashMap<String, String>) -> Arc<CompiledPattern> {
        let key = Self::cache_key(template, overrides);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(compiled) = cache.get(&key) {
            return compiled.clone();
        }

        let compiled = Arc::new(CompiledPattern::compile(template, overrides, self.engine));
        cache.insert(key, compiled.clone());
        compiled
    }

    /// Number of distinct compiled patterns.
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every compiled pattern.
    pub fn clear(&self) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn cache_key(template: &str, overrides: &HashMap<String, String>) -> String {
        let mut signature: Vec<String> = overrides
            .iter()
            .map(|(name, pattern)| format!("{}={}", name, pattern))
            .collect();
        signature.sort();
        format!("{}\u{0}{}", template, signature.join("\u{1}"))
    }
}
