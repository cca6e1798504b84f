//! Mock administration module
//!
//! Handles `/mocks` (verify, register, reset), `/meta` (registry dump) and
//! builds the response for a fulfilled mock.

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::mocks::{MockDefinition, MockResponse};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;

/// Methods accepted on `/mocks`
const MOCKS_ALLOW: &str = "GET, POST, DELETE";

/// Body of `GET /mocks`
#[derive(Debug, Serialize)]
struct Verification {
    #[serde(rename = "allCalled")]
    all_called: bool,
}

/// Dispatch a `/mocks` request by method
pub async fn handle_mocks<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    match method {
        Method::GET => verify(state),
        Method::POST => register(req, state).await,
        Method::DELETE => reset(state),
        other => {
            logger::log_warning(&format!("Method not allowed on /mocks: {other}"));
            http::build_405_response(MOCKS_ALLOW)
        }
    }
}

/// Dump the whole registry, `called` flags included
pub fn handle_meta(state: &AppState) -> Response<Full<Bytes>> {
    http::build_json_response(StatusCode::OK, &state.mocks.snapshot())
}

/// Build the response for a matched mock: its status and literal body
pub fn build_mock_response(status: u16, response: MockResponse) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(status).unwrap_or_else(|e| {
        logger::log_error(&format!("Mock has invalid status {status}: {e}"));
        StatusCode::INTERNAL_SERVER_ERROR
    });
    http::build_json_text_response(status, response.body)
}

fn verify(state: &AppState) -> Response<Full<Bytes>> {
    let verification = Verification {
        all_called: state.mocks.all_called(),
    };
    http::build_json_response(StatusCode::OK, &verification)
}

fn reset(state: &AppState) -> Response<Full<Bytes>> {
    state.mocks.clear();
    logger::log_mocks_reset();
    http::build_204_response()
}

/// Buffer the full body, parse it and register the definition
///
/// Nothing is registered unless the whole body arrives and validates.
async fn register<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(&req, max_body_size) {
        return resp;
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let whole_body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_warning(&format!("Mock registration body exceeds {max_body_size} bytes"));
            return http::build_413_response(max_body_size);
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            return http::build_error_response(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            );
        }
    };

    let definition = match MockDefinition::from_json(&whole_body) {
        Ok(d) => d,
        Err(e) => {
            logger::log_warning(&format!("Rejected mock registration: {e}"));
            return http::build_error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    let method = definition.method.clone();
    let url = definition.url.clone();
    state.mocks.register(definition);
    logger::log_mock_registered(&method, &url, state.mocks.len());

    http::build_204_response()
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response(max_body_size))
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}
