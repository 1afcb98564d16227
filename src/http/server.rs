//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway and status handlers
//! - Wire up middleware (tracing, request ID)
//! - Serve on a bound listener until shutdown
//! - Apply config reloads to the live gateway settings

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::gateway::{setup_gateway_router, GatewayState};
use crate::health;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::{shutdown, signals};

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    gateway: GatewayState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let gateway = GatewayState::new(&config)?;
        let router = Self::build_router(gateway.clone());

        Ok(Self {
            router,
            config,
            gateway,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The inbound request timeout is enforced by the forward handler so an
    /// expired request still gets the 502 envelope.
    fn build_router(gateway: GatewayState) -> Router {
        setup_gateway_router(gateway)
            .route("/healthz", get(health::get_status))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs received on `config_updates` are applied while serving. The
    /// server stops on `shutdown` or on an OS termination signal.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_prefix = %self.config.upstream.mount_prefix,
            upstream = %self.config.upstream.base_url,
            auth_mode = ?self.config.auth.mode,
            "HTTP server starting"
        );

        let gateway = self.gateway.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                gateway.reload(&config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown::notified(shutdown) => {}
                    _ = signals::wait_for_signal() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Live gateway state, shared with the running server.
    pub fn gateway(&self) -> &GatewayState {
        &self.gateway
    }
}
