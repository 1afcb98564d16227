//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, env overrides, normalize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → sent to the running server
//!     → atomic swap of the live upstream/auth settings
//! ```
//!
//! `EXTERNAL_API_BASE_URL` always wins over the file's `upstream.base_url`.

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{default_config, load_config, ConfigError};
pub use schema::{
    AuthConfig, AuthMode, GatewayConfig, ListenerConfig, ObservabilityConfig, TimeoutConfig,
    UpstreamConfig,
};
pub use watcher::ConfigWatcher;
