//! Shared error type across scrapegate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input, e.g. missing `target`.
    BadRequest,
    /// Collector could not be constructed for a target.
    CollectorInit,
    /// A scrape against an existing collector failed.
    GatherFailed,
    /// Invalid configuration.
    Config,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::CollectorInit => "COLLECTOR_INIT",
            ClientCode::GatherFailed => "GATHER_FAILED",
            ClientCode::Config => "CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// Whether the caller is at fault (4xx) rather than the gateway (5xx).
    pub fn is_client_error(self) -> bool {
        matches!(self, ClientCode::BadRequest)
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("error instantiating metrics collector for host {target}: {reason}")]
    CollectorInit { target: String, reason: String },
    #[error("error collecting metrics for host {target}: {reason}")]
    Gather { target: String, reason: String },
    #[error("telemetry: {0}")]
    Telemetry(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            GatewayError::BadRequest(_) => ClientCode::BadRequest,
            GatewayError::CollectorInit { .. } => ClientCode::CollectorInit,
            GatewayError::Gather { .. } => ClientCode::GatherFailed,
            GatewayError::Telemetry(_) => ClientCode::Internal,
            GatewayError::Config(_) => ClientCode::Config,
            GatewayError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Attach target context to a failure raised while building a collector.
    /// Errors that already carry a target are passed through untouched.
    pub fn into_collector_init(self, target: &str) -> Self {
        match self {
            e @ (GatewayError::CollectorInit { .. } | GatewayError::Gather { .. }) => e,
            other => GatewayError::CollectorInit {
                target: target.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Attach target context to a failure raised while gathering.
    pub fn into_gather(self, target: &str) -> Self {
        match self {
            e @ (GatewayError::CollectorInit { .. } | GatewayError::Gather { .. }) => e,
            other => GatewayError::Gather {
                target: target.to_string(),
                reason: other.to_string(),
            },
        }
    }
}
