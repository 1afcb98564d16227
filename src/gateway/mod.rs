//! Request forwarding gateway.
//!
//! # Data Flow
//! ```text
//! {METHOD} {mount_prefix}/a/b?q
//!     → auth.rs (configured posture: none | bearer)
//!     → forward.rs (one handler for all methods; unsupported ones get 405)
//!         → rewrite.rs ({base_url}/a/b?q)
//!         → headers.rs (request allow-list)
//!         → upstream call (reqwest)
//!         → headers.rs (strip framing, force no-cache)
//!     → error.rs on any failure (502 + JSON envelope)
//! ```
//!
//! The gateway keeps no state between requests apart from the live settings
//! snapshot, so concurrent calls never coordinate.

pub mod auth;
pub mod error;
pub mod forward;
pub mod headers;
pub mod rewrite;
pub mod state;

use axum::{
    middleware,
    routing::any,
    Router,
};

pub use error::{ErrorEnvelope, FailureKind, GatewayError, UPSTREAM_ERROR_MESSAGE};
pub use forward::{ForwardMethod, ForwardedRequest, ForwardedResponse};
pub use rewrite::rewrite_target;
pub use state::{GatewayState, UpstreamSettings};

use self::auth::gateway_auth_middleware;
use self::forward::forward_handler;

/// Build the forwarding router mounted under the configured prefix.
pub fn setup_gateway_router(state: GatewayState) -> Router {
    let prefix = state.settings().mount_prefix.clone();

    Router::new()
        .route(&format!("{}/{{*path}}", prefix), any(forward_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            gateway_auth_middleware,
        ))
        .with_state(state)
}
