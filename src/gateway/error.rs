//! Gateway failure envelope.
//!
//! Every transport-level failure becomes `502 Bad Gateway` with a fixed JSON
//! body. Failures are still classified, but only for logs and metrics.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::gateway::headers::apply_no_cache;
use crate::gateway::rewrite::RewriteError;

/// Localized message shown to dashboard users on any upstream failure.
pub const UPSTREAM_ERROR_MESSAGE: &str = "Lỗi kết nối đến API bên ngoài";

/// Body of every 502 produced by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub message: String,
    pub error: String,
}

/// Coarse failure classification used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connect,
    Body,
    Other,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connect",
            FailureKind::Body => "body",
            FailureKind::Other => "other",
        }
    }
}

/// Anything that can go wrong while forwarding a request.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("invalid upstream target `{target}`: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    #[error("failed to read upstream response body: {0}")]
    UpstreamBody(#[source] reqwest::Error),
}

impl GatewayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::RequestBody(_) | GatewayError::UpstreamBody(_) => FailureKind::Body,
            GatewayError::Rewrite(_) | GatewayError::InvalidTarget { .. } => FailureKind::Other,
            GatewayError::Timeout(_) => FailureKind::Timeout,
            GatewayError::Upstream(e) if e.is_timeout() => FailureKind::Timeout,
            GatewayError::Upstream(e) if e.is_connect() => FailureKind::Connect,
            GatewayError::Upstream(_) => FailureKind::Other,
        }
    }

    /// Failure detail as carried in the `error` field.
    pub fn detail(&self) -> String {
        match self {
            // reqwest's Display omits the root cause; walk the chain.
            GatewayError::Upstream(e) | GatewayError::UpstreamBody(e) => {
                let mut detail = e.to_string();
                let mut source = std::error::Error::source(e);
                while let Some(cause) = source {
                    detail.push_str(": ");
                    detail.push_str(&cause.to_string());
                    source = cause.source();
                }
                detail
            }
            other => other.to_string(),
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            message: UPSTREAM_ERROR_MESSAGE.to_string(),
            error: self.detail(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::BAD_GATEWAY, Json(self.envelope())).into_response();
        apply_no_cache(response.headers_mut());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_invalid_target_maps_to_502_envelope() {
        let err = GatewayError::InvalidTarget {
            target: "http://[bad".into(),
            source: url::ParseError::InvalidIpv6Address,
        };
        assert_eq!(err.kind(), FailureKind::Other);

        let envelope = err.envelope();
        assert_eq!(envelope.message, UPSTREAM_ERROR_MESSAGE);
        assert!(envelope.error.contains("http://[bad"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache, no-store, must-revalidate");
        assert_eq!(response.headers()[header::PRAGMA], "no-cache");
        assert_eq!(response.headers()[header::EXPIRES], "0");
    }

    #[test]
    fn test_timeout_is_classified() {
        let err = GatewayError::Timeout(Duration::from_secs(1));
        assert_eq!(err.kind(), FailureKind::Timeout);
        assert_eq!(err.envelope().error, "request timed out after 1s");
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_envelope_shape() {
        let value = serde_json::to_value(ErrorEnvelope {
            message: UPSTREAM_ERROR_MESSAGE.into(),
            error: "connection refused".into(),
        })
        .unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["error", "message"]);
    }
}
