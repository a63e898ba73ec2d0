// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Reverse routing: named route + parameters → URL.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{Result, RouterError};
use crate::pattern::{Params, Segment};
use crate::route::Route;

/// Everything except RFC 3986 unreserved characters is encoded.
const PARAM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// [`PARAM_ENCODE_SET`] with `/` left alone.
const PATH_ENCODE_SET: &AsciiSet = &PARAM_ENCODE_SET.remove(b'/');

/// Substitutes `params` into the route's template.
///
/// Values are percent-encoded. A slash inside a value is encoded too,
/// unless the placeholder's sub-pattern accepts the value whole (as in
/// `/{path:.+}`), in which case it stays a path separator.
/// Parameters the template does not mention are ignored. Values are not
/// checked against the route's schema.
pub fn generate(name: &str, route: &Route, params: &Params) -> Result<String> {
    let mut url = String::new();
    for segment in route.matcher.segments() {
        match segment {
            Segment::Literal(text) => url.push_str(text),
            Segment::Placeholder { name: param, .. } => {
                let value = params.get(param).ok_or_else(|| RouterError::MissingParameter {
                    route: name.to_string(),
                    param: param.clone(),
                })?;
                let set = if route.matcher.keeps_slashes(param, value) {
                    PATH_ENCODE_SET
                } else {
                    PARAM_ENCODE_SET
                };
                url.extend(utf8_percent_encode(value, set));
            }
        }
    }
    Ok(url)
}

/// Prefixes a generated path with `base_url`.
pub fn absolute(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
