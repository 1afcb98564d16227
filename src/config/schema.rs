//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Upstream base URL used when neither the config file nor the environment sets one.
pub const PLACEHOLDER_UPSTREAM: &str = "https://api.example.com";

/// Environment variable that overrides `upstream.base_url`.
pub const UPSTREAM_ENV_VAR: &str = "EXTERNAL_API_BASE_URL";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream API the gateway forwards to.
    pub upstream: UpstreamConfig,

    /// Authentication posture of the forwarding route.
    pub auth: AuthConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// Apply environment overrides on top of file/default values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(UPSTREAM_ENV_VAR) {
            if !base_url.trim().is_empty() {
                self.upstream.base_url = base_url;
            }
        }
    }

    /// Trim trailing slashes so the path rewrite never produces `//`.
    pub fn normalize(&mut self) {
        let trimmed = self.upstream.base_url.trim().trim_end_matches('/');
        self.upstream.base_url = trimmed.to_string();
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the external API, without trailing slash.
    pub base_url: String,

    /// Path prefix the gateway is mounted under (e.g., "/api/proxy").
    pub mount_prefix: String,

    /// Optional total timeout for the outbound call in seconds.
    /// Unset means the transport default (no deadline).
    pub timeout_secs: Option<u64>,

    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: PLACEHOLDER_UPSTREAM.to_string(),
            mount_prefix: "/api/proxy".to_string(),
            timeout_secs: None,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// How the forwarding route authenticates callers.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Public passthrough.
    #[default]
    None,
    /// `Authorization: Bearer <token>` required.
    Bearer,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,

    /// Shared bearer token, required when `mode = "bearer"`.
    pub token: String,
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: Option<u64>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.upstream.base_url, PLACEHOLDER_UPSTREAM);
        assert_eq!(config.upstream.mount_prefix, "/api/proxy");
        assert_eq!(config.auth.mode, AuthMode::None);
        assert!(config.upstream.timeout_secs.is_none());
        assert!(config.timeouts.request_secs.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [upstream]
            base_url = "https://parking.internal/api/"

            [auth]
            mode = "bearer"
            token = "s3cret"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.mount_prefix, "/api/proxy");
        assert_eq!(config.auth.mode, AuthMode::Bearer);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_env_override() {
        let mut config = GatewayConfig::default();
        config.apply_overrides(|key| {
            (key == UPSTREAM_ENV_VAR).then(|| "https://up.example".to_string())
        });
        assert_eq!(config.upstream.base_url, "https://up.example");

        // Blank values are ignored
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.upstream.base_url, "https://up.example");
    }

    #[test]
    fn test_normalize_trims_trailing_slash() {
        let mut config = GatewayConfig::default();
        config.upstream.base_url = "https://up.example//".into();
        config.normalize();
        assert_eq!(config.upstream.base_url, "https://up.example");
    }
}
