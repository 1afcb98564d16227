//! Smart parking admin gateway.
//!
//! Two pieces back the parking administration dashboard:
//! - `gateway`: a pass-through that forwards `/api/proxy/**` to the external
//!   parking API, normalizing cache headers and failures.
//! - `tree`: a recursive, lazily expanding table model for the
//!   parking lot → area → floor → space hierarchy.

pub mod config;
pub mod gateway;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod parking;
pub mod tree;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
