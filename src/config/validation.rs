//! Configuration validation.
//!
//! Semantic checks only; serde handles syntax. Returns every error found,
//! not just the first.

use std::net::SocketAddr;
use url::Url;

use crate::config::schema::{AuthMode, GatewayConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("upstream.base_url `{0}` is not an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("upstream.mount_prefix `{0}` must start with '/' and must not end with '/'")]
    InvalidMountPrefix(String),

    #[error("auth.token must be set when auth.mode is bearer")]
    MissingToken,

    #[error("{field} `{value}` is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(
            config.upstream.base_url.clone(),
        )),
    }

    let prefix = &config.upstream.mount_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::InvalidMountPrefix(prefix.clone()));
    }

    if config.auth.mode == AuthMode::Bearer && config.auth.token.is_empty() {
        errors.push(ValidationError::MissingToken);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.upstream.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroValue("upstream.timeout_secs"));
    }
    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.upstream.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("upstream.max_body_size"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.upstream.base_url = "not a url".into();
        config.upstream.mount_prefix = "api/proxy/".into();
        config.auth.mode = AuthMode::Bearer;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::MissingToken));
    }

    #[test]
    fn test_rejects_root_prefix_and_non_http_scheme() {
        let mut config = GatewayConfig::default();
        config.upstream.mount_prefix = "/".into();
        config.upstream.base_url = "ftp://files.example".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidBaseUrl(_)));
        assert!(matches!(errors[1], ValidationError::InvalidMountPrefix(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = GatewayConfig::default();
        config.upstream.timeout_secs = Some(0);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ZeroValue("upstream.timeout_secs")]);
    }
}
