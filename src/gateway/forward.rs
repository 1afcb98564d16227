//! Request forwarding.
//!
//! One handler serves every supported method. The inbound request is turned
//! into a [`ForwardedRequest`], sent upstream, and the reply is relayed as a
//! [`ForwardedResponse`]. Any failure on the way becomes a 502 envelope.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use std::time::Instant;
use url::Url;

use crate::gateway::error::GatewayError;
use crate::gateway::headers::{apply_no_cache, forwarded_request_headers, relay_response_headers};
use crate::gateway::rewrite::rewrite_target;
use crate::gateway::state::{GatewayState, UpstreamSettings};
use crate::http::RequestIdExt;
use crate::observability::metrics;

/// Methods the gateway forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForwardMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl ForwardMethod {
    pub const ALL: [ForwardMethod; 7] = [
        ForwardMethod::Get,
        ForwardMethod::Post,
        ForwardMethod::Put,
        ForwardMethod::Delete,
        ForwardMethod::Patch,
        ForwardMethod::Options,
        ForwardMethod::Head,
    ];

    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(ForwardMethod::Get),
            Method::POST => Some(ForwardMethod::Post),
            Method::PUT => Some(ForwardMethod::Put),
            Method::DELETE => Some(ForwardMethod::Delete),
            Method::PATCH => Some(ForwardMethod::Patch),
            Method::OPTIONS => Some(ForwardMethod::Options),
            Method::HEAD => Some(ForwardMethod::Head),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Method {
        match self {
            ForwardMethod::Get => Method::GET,
            ForwardMethod::Post => Method::POST,
            ForwardMethod::Put => Method::PUT,
            ForwardMethod::Delete => Method::DELETE,
            ForwardMethod::Patch => Method::PATCH,
            ForwardMethod::Options => Method::OPTIONS,
            ForwardMethod::Head => Method::HEAD,
        }
    }

    /// GET and HEAD never carry a body upstream, even if the client sent one.
    pub fn carries_body(&self) -> bool {
        !matches!(self, ForwardMethod::Get | ForwardMethod::Head)
    }
}

/// The outbound leg of a forwarded call.
#[derive(Debug, Clone)]
pub struct ForwardedRequest {
    pub method: ForwardMethod,
    pub target: Url,
    pub headers: HeaderMap,
    /// Raw body as text; `None` for GET/HEAD.
    pub body: Option<String>,
}

impl ForwardedRequest {
    /// Build the outbound request from an inbound one.
    ///
    /// Bodies are decoded as UTF-8 text (lossily), so binary payloads are not
    /// preserved.
    pub async fn from_inbound(
        method: ForwardMethod,
        request: Request<Body>,
        settings: &UpstreamSettings,
    ) -> Result<Self, GatewayError> {
        let (parts, body) = request.into_parts();

        let target = rewrite_target(
            &settings.base_url,
            &settings.mount_prefix,
            parts.uri.path(),
            parts.uri.query(),
        )?;
        let target = Url::parse(&target)
            .map_err(|source| GatewayError::InvalidTarget { target, source })?;

        let body = if method.carries_body() {
            let bytes = axum::body::to_bytes(body, settings.max_body_size)
                .await
                .map_err(GatewayError::RequestBody)?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            None
        };

        Ok(Self {
            method,
            target,
            headers: forwarded_request_headers(&parts.headers),
            body,
        })
    }

    /// Send the request upstream and buffer the reply.
    pub async fn send(
        self,
        client: &reqwest::Client,
        settings: &UpstreamSettings,
    ) -> Result<ForwardedResponse, GatewayError> {
        let mut builder = client
            .request(self.method.as_method(), self.target)
            .headers(self.headers);

        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = self.body {
            builder = builder.body(body);
        }

        let upstream = builder.send().await.map_err(GatewayError::Upstream)?;
        ForwardedResponse::from_upstream(upstream).await
    }
}

/// The upstream reply as relayed to the client.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ForwardedResponse {
    pub async fn from_upstream(upstream: reqwest::Response) -> Result<Self, GatewayError> {
        let status = upstream.status();
        let headers = relay_response_headers(upstream.headers());
        let body = upstream.bytes().await.map_err(GatewayError::UpstreamBody)?;

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Canonical reason phrase of the relayed status.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }
}

impl IntoResponse for ForwardedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Shared handler for every forwarded method.
pub async fn forward_handler(
    State(state): State<GatewayState>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let settings = state.settings();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request.request_id().unwrap_or("unknown").to_string();

    let Some(forward_method) = ForwardMethod::from_method(&method) else {
        tracing::warn!(request_id = %request_id, method = %method, "Unsupported method");
        let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
        apply_no_cache(response.headers_mut());
        return response;
    };

    let forward = async {
        let outbound = ForwardedRequest::from_inbound(forward_method, request, &settings).await?;
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            target = %outbound.target,
            "Forwarding request"
        );
        outbound.send(&state.client, &settings).await
    };

    let result = match settings.request_timeout {
        Some(limit) => tokio::time::timeout(limit, forward)
            .await
            .unwrap_or_else(|_| Err(GatewayError::Timeout(limit))),
        None => forward.await,
    };

    let response = match result {
        Ok(forwarded) => {
            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = forwarded.status.as_u16(),
                status_text = forwarded.status_text(),
                "Upstream responded"
            );
            forwarded.into_response()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                kind = e.kind().as_str(),
                error = %e.detail(),
                "Upstream error"
            );
            metrics::record_upstream_failure(e.kind().as_str());
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}
