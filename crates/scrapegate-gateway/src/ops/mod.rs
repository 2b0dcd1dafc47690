//! HTTP endpoints.
//!
//! - `/`        : landing page
//! - `/health`  : liveness, 200 with empty body
//! - `/metrics` : scrape `?target=...`, gzip when accepted
//! - `/reset`   : drop the cached collector for `?target=...`

use axum::{
    extract::{Query, State},
    http::{
        header::{CONTENT_ENCODING, CONTENT_TYPE, HOST, VARY},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Response},
};

use scrapegate_core::error::{GatewayError, Result};

use crate::app_state::AppState;
use crate::compress::{gzip_accepted, GZIP};

const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Raw query pairs in request order; repeated keys are kept.
pub type QueryPairs = Vec<(String, String)>;

/// First `target` value, if any.
pub fn first_target(pairs: QueryPairs) -> Option<String> {
    pairs
        .into_iter()
        .find(|(k, _)| k == "target")
        .map(|(_, v)| v)
}

/// HTTP view of a `GatewayError`: status from the client code, body is the
/// error text.
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.client_code().is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", self.0),
        )
            .into_response()
    }
}

fn requester(headers: &HeaderMap) -> &str {
    headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
}

fn require_target(q: QueryPairs, headers: &HeaderMap) -> Result<String> {
    match first_target(q) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => {
            tracing::error!(from = %requester(headers), "request without 'target' parameter");
            Err(GatewayError::BadRequest(
                "query parameter 'target' is mandatory".into(),
            ))
        }
    }
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn root() -> Html<&'static str> {
    Html(concat!(
        "<html>\n",
        "<head><title>scrapegate</title></head>\n",
        "<body>\n",
        "<h1>scrapegate</h1>\n",
        "<p><a href=\"/health\">Health</a></p>\n",
        "<form action=\"/metrics\">\n",
        "<label>Target:</label> <input type=\"text\" name=\"target\" placeholder=\"host\">\n",
        "<input type=\"submit\" value=\"Scrape\">\n",
        "</form>\n",
        "</body>\n",
        "</html>\n",
    ))
}

pub async fn reset(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<QueryPairs>,
) -> std::result::Result<StatusCode, ApiError> {
    let target = require_target(q, &headers)?;
    tracing::debug!(from = %requester(&headers), host = %target, "handling reset request");

    let removed = app.registry().reset(&target);
    tracing::debug!(host = %target, removed, "collector reset");
    Ok(StatusCode::OK)
}

pub async fn metrics(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<QueryPairs>,
) -> std::result::Result<Response, ApiError> {
    let target = require_target(q, &headers)?;
    tracing::debug!(from = %requester(&headers), host = %target, "handling metrics request");

    let collector = app
        .registry()
        .get_or_create(&target)
        .await
        .inspect_err(|e| tracing::error!(host = %target, "{e}"))?;

    tracing::debug!(host = %target, "collecting metrics");
    let body = collector
        .gather()
        .await
        .map_err(|e| e.into_gather(&target))
        .inspect_err(|e| tracing::error!(host = %target, "{e}"))?;
    tracing::debug!(host = %target, bytes = body.len(), "metrics collected");

    if !gzip_accepted(&headers) {
        return Ok((
            [(CONTENT_TYPE, CONTENT_TYPE_TEXT), (VARY, "Accept-Encoding")],
            body,
        )
            .into_response());
    }

    let compressed = {
        let mut gz = app.gzip().acquire().await?;
        gz.compress(body.as_bytes())?
    };
    Ok((
        [
            (CONTENT_TYPE, CONTENT_TYPE_TEXT),
            (CONTENT_ENCODING, GZIP),
            (VARY, "Accept-Encoding"),
        ],
        compressed,
    )
        .into_response())
}
