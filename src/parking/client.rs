//! Parking data access through the gateway.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use crate::parking::EntityKind;
use crate::tree::{ChildFetcher, FetchError};

/// Client for parking collections behind a gateway mount.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    /// Gateway URL including the mount prefix, e.g. `http://localhost:8080/api/proxy`.
    base: String,
    headers: HeaderMap,
}

impl GatewayClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
            headers: HeaderMap::new(),
        }
    }

    /// Send `Authorization: Bearer <token>` with every call.
    pub fn with_token(mut self, token: &str) -> Result<Self, reqwest::header::InvalidHeaderValue> {
        self.headers
            .insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
        Ok(self)
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Fetch a whole collection.
    pub async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, FetchError> {
        self.get(kind, None).await
    }

    /// Fetch the children of one parent, filtered by the parent's id field.
    pub async fn children(&self, child: EntityKind, parent_id: &str) -> Result<Vec<Value>, FetchError> {
        let parent = child
            .parent()
            .ok_or_else(|| FetchError::UnknownEntity(format!("{} has no parent", child)))?;
        self.get(child, Some((parent.id_key(), parent_id))).await
    }

    async fn get(&self, kind: EntityKind, filter: Option<(&str, &str)>) -> Result<Vec<Value>, FetchError> {
        let url = format!("{}/{}", self.base, kind.resource());
        let mut request = self.client.get(&url).headers(self.headers.clone());
        if let Some(filter) = filter {
            request = request.query(&[filter]);
        }

        tracing::debug!(url = %url, filter = ?filter, "Fetching {}", kind);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        extract_rows(response.json().await?)
    }
}

impl ChildFetcher<Value> for GatewayClient {
    async fn fetch_children(&self, child_type: &str, parent_id: &str) -> Result<Vec<Value>, FetchError> {
        let kind: EntityKind = child_type
            .parse()
            .map_err(|_| FetchError::UnknownEntity(child_type.to_string()))?;
        self.children(kind, parent_id).await
    }
}

/// Accept a bare array or an object wrapping it under `data`.
pub fn extract_rows(body: Value) -> Result<Vec<Value>, FetchError> {
    match body {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Err(FetchError::Decode("object without a `data` array".to_string())),
        },
        other => Err(FetchError::Decode(format!("expected array, got {}", other))),
    }
}
