use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::AuthMode;
use crate::gateway::headers::apply_no_cache;
use crate::gateway::state::GatewayState;

/// Enforce the configured auth posture on the forwarding route.
///
/// `none` passes everything through. `bearer` requires
/// `Authorization: Bearer <token>`. The header itself is never forwarded.
pub async fn gateway_auth_middleware(
    State(state): State<GatewayState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let settings = state.settings();

    if settings.auth.mode == AuthMode::None {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| tokens_match(token.as_bytes(), settings.auth.token.as_bytes()));

    if authorized {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rejected unauthenticated gateway request");
    let mut response = StatusCode::UNAUTHORIZED.into_response();
    apply_no_cache(response.headers_mut());
    response
}

/// Compare a presented token with the configured one in time that depends
/// only on the configured token's length.
fn tokens_match(presented: &[u8], expected: &[u8]) -> bool {
    let mut diff = presented.len() ^ expected.len();
    for (i, byte) in expected.iter().enumerate() {
        let other = presented.get(i).copied().unwrap_or(0);
        diff |= usize::from(other ^ byte);
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match(b"s3cret", b"s3cret"));
        assert!(!tokens_match(b"s3creT", b"s3cret"));
        assert!(!tokens_match(b"s3cre", b"s3cret"));
        assert!(!tokens_match(b"s3cret!", b"s3cret"));
        assert!(!tokens_match(b"", b"s3cret"));
        assert!(tokens_match(b"", b""));
    }
}
