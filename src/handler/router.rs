//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Priority order is fixed:
//! 1. `/mocks` administration
//! 2. `/meta` registry dump
//! 3. Static files under the configured root
//! 4. Registered mocks
//! 5. 404 with an empty JSON object

use crate::config::AppState;
use crate::handler::{mocks, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry, Outcome};
use crate::mocks::matcher;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER, USER_AGENT};
use hyper::{Method, Request, Response};
use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

pub const MOCKS_PATH: &str = "/mocks";
pub const META_PATH: &str = "/meta";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let raw_path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let path = decode_path(&raw_path);
    let (mut response, outcome) =
        route_request(req, &method, &path, query.as_deref(), &state).await;

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if state.access_log_enabled() {
        let mut entry = AccessLogEntry::new(
            remote_addr.map_or_else(|| "-".to_string(), |a| a.ip().to_string()),
            method.to_string(),
            raw_path,
        );
        entry.query = query;
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().lower()).unwrap_or(0);
        entry.user_agent = user_agent;
        entry.outcome = outcome;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Percent-decode the path component, keeping the raw form if it is not UTF-8
fn decode_path(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Route request based on path
async fn route_request<B>(
    req: Request<B>,
    method: &Method,
    path: &str,
    query: Option<&str>,
    state: &AppState,
) -> (Response<Full<Bytes>>, Outcome)
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match path {
        MOCKS_PATH => (mocks::handle_mocks(req, state).await, Outcome::Admin),
        META_PATH => (mocks::handle_meta(state), Outcome::Admin),
        _ => serve_static_or_mock(method, path, query, state).await,
    }
}

/// Static files first, then mocks, then 404
async fn serve_static_or_mock(
    method: &Method,
    path: &str,
    query: Option<&str>,
    state: &AppState,
) -> (Response<Full<Bytes>>, Outcome) {
    if let Some(file_path) = static_files::resolve(&state.static_root, path).await {
        let response = static_files::serve(file_path).await;
        let outcome = if response.status().is_success() {
            Outcome::Static
        } else {
            Outcome::Error
        };
        return (response, outcome);
    }

    let params = matcher::parse_query(query);
    match state.mocks.fulfill(path, method.as_str(), &params) {
        Some((status, response)) => (mocks::build_mock_response(status, response), Outcome::Mock),
        None => (http::build_404_response(), Outcome::NotFound),
    }
}
