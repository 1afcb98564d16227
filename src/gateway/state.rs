//! Shared gateway state.
//!
//! Settings that may change on config reload live behind an `ArcSwap` so the
//! hot path reads them without locking. The outbound client is built once.

use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AuthConfig, GatewayConfig};

/// Live forwarding settings.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub mount_prefix: String,
    /// Outbound call timeout.
    pub timeout: Option<Duration>,
    /// Budget for the whole forward, body read included.
    pub request_timeout: Option<Duration>,
    pub max_body_size: usize,
    pub auth: AuthConfig,
}

impl UpstreamSettings {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            base_url: config.upstream.base_url.clone(),
            mount_prefix: config.upstream.mount_prefix.clone(),
            timeout: config.upstream.timeout_secs.map(Duration::from_secs),
            request_timeout: config.timeouts.request_secs.map(Duration::from_secs),
            max_body_size: config.upstream.max_body_size,
            auth: config.auth.clone(),
        }
    }
}

/// State injected into the gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub settings: Arc<ArcSwap<UpstreamSettings>>,
    pub client: reqwest::Client,
}

impl GatewayState {
    /// Create the state and its outbound HTTP client.
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        // Upstream is reached directly; system proxy variables are ignored.
        let client = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self {
            settings: Arc::new(ArcSwap::from_pointee(UpstreamSettings::from_config(config))),
            client,
        })
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Arc<UpstreamSettings> {
        self.settings.load_full()
    }

    /// Apply a reloaded configuration.
    ///
    /// The mount prefix is fixed by the router at startup, so a changed prefix
    /// is ignored until restart.
    pub fn reload(&self, config: &GatewayConfig) {
        let current = self.settings.load_full();
        let mut next = UpstreamSettings::from_config(config);

        if next.mount_prefix != current.mount_prefix {
            tracing::warn!(
                current = %current.mount_prefix,
                requested = %next.mount_prefix,
                "Mount prefix change requires a restart, keeping current prefix"
            );
            next.mount_prefix = current.mount_prefix.clone();
        }

        if next == *current {
            tracing::debug!("Reloaded config has no gateway changes");
            return;
        }

        tracing::info!(
            base_url = %next.base_url,
            auth_mode = ?next.auth.mode,
            timeout = ?next.timeout,
            "Gateway settings reloaded"
        );
        self.settings.store(Arc::new(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthMode;

    #[test]
    fn test_reload_swaps_upstream_but_keeps_prefix() {
        let config = GatewayConfig::default();
        let state = GatewayState::new(&config).unwrap();

        let mut updated = config.clone();
        updated.upstream.base_url = "https://new.example".into();
        updated.upstream.mount_prefix = "/other".into();
        updated.upstream.timeout_secs = Some(3);
        updated.auth.mode = AuthMode::Bearer;
        updated.auth.token = "t".into();
        state.reload(&updated);

        let settings = state.settings();
        assert_eq!(settings.base_url, "https://new.example");
        assert_eq!(settings.mount_prefix, "/api/proxy");
        assert_eq!(settings.timeout, Some(Duration::from_secs(3)));
        assert_eq!(settings.auth.mode, AuthMode::Bearer);
    }
}
