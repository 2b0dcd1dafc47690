//! Response compression.
//!
//! Only gzip is offered. `gzip_accepted` negotiates it from `Accept-Encoding`;
//! `GzipPool` hands out reusable encoders so scrapes do not allocate a fresh
//! deflate state per response.

mod pool;

pub use pool::{GzipPool, PooledGzip};

use axum::http::{header::ACCEPT_ENCODING, HeaderMap};

/// Content-coding name advertised and matched against `Accept-Encoding`.
pub const GZIP: &str = "gzip";

/// Whether the client will accept gzip-encoded content.
///
/// Every `Accept-Encoding` header value is split on commas; a token matches
/// when it is `gzip` or starts with `gzip;` (quality-value suffix).
pub fn gzip_accepted(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .any(|part| {
            part == GZIP
                || part
                    .strip_prefix(GZIP)
                    .is_some_and(|rest| rest.starts_with(';'))
        })
}
