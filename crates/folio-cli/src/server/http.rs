// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP adapter.
//!
//! A thin layer that converts axum requests to [`folio::Request`], calls
//! `router.dispatch()`, and converts the dispatch result back to HTTP.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Router,
};
use folio::{Dispatch, RouterError};

use super::AppState;

const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Builds the axum application. Every path goes through the folio router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .fallback(fallback_handler)
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn fallback_handler(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let method = parts.method;
    let path = parts.uri.path().to_string();

    let query: HashMap<String, String> = parts
        .uri
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();

    let headers: HashMap<String, String> = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let mut folio_request = folio::Request::new(method.as_str(), path)
        .with_query(query)
        .with_headers(headers);

    if method != Method::GET && method != Method::HEAD {
        match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
            Ok(bytes) if !bytes.is_empty() => {
                folio_request = folio_request.with_body(bytes.to_vec());
            }
            Ok(_) => {}
            Err(_) => {
                return (StatusCode::PAYLOAD_TOO_LARGE, "Body too large").into_response();
            }
        }
    }

    match state.router.dispatch(&folio_request) {
        Ok(Dispatch::Response(response)) => to_http(response),
        Ok(Dispatch::Content(target)) => match state.content.read(&target.path) {
            Some(text) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                text,
            )
                .into_response(),
            None => error_page(
                StatusCode::NOT_FOUND,
                &format!("Content not found: {}", target.path),
            ),
        },
        Err(e) => router_error(&e),
    }
}

fn to_http(response: folio::Response) -> Response {
    match response {
        folio::Response::Html { status, headers, body } => {
            let status_code = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
            let mut builder = Response::builder()
                .status(status_code)
                .header(header::CONTENT_TYPE, "text/html; charset=utf-8");
            for (key, value) in &headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
            builder.body(Body::from(body)).unwrap_or_else(|_| build_failure())
        }
        folio::Response::Json { status, headers, body } => {
            let status_code = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
            let mut builder = Response::builder()
                .status(status_code)
                .header(header::CONTENT_TYPE, "application/json");
            for (key, value) in &headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
            builder
                .body(Body::from(body.to_string()))
                .unwrap_or_else(|_| build_failure())
        }
        folio::Response::Redirect { status, location } => {
            let status_code = StatusCode::from_u16(status).unwrap_or(StatusCode::FOUND);
            Response::builder()
                .status(status_code)
                .header(header::LOCATION, location)
                .body(Body::empty())
                .unwrap_or_else(|_| build_failure())
        }
    }
}

fn build_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response()
}

fn router_error(error: &RouterError) -> Response {
    let status = StatusCode::from_u16(error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!("{}", error);
    }
    error_page(status, &error.to_string())
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let page = Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{} - Folio</title>
    <style>
        body {{ font-family: system-ui, sans-serif; padding: 2rem; background: #1a1a2e; color: #eee; }}
        .error {{ background: #16213e; border-left: 4px solid #e94560; padding: 1rem; border-radius: 4px; }}
        pre {{ background: #0f0f1a; padding: 1rem; overflow-x: auto; border-radius: 4px; }}
    </style>
</head>
<body>
    <h1>{}</h1>
    <div class="error">
        <pre>{}</pre>
    </div>
</body>
</html>"#,
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error"),
        html_escape(message)
    ));
    (status, page).into_response()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_redirect_mapping() {
        let response = to_http(folio::Response::redirect("/login"));
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[test]
    fn test_router_error_status() {
        let response = router_error(&RouterError::InvalidParameter {
            name: "id".to_string(),
            reason: "not an integer".to_string(),
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router_error(&RouterError::HandlerResolution("missing".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
