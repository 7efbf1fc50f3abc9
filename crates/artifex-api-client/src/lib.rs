//! Shared HTTP client for the Artifex artifact API.
//!
//! Provides a minimal client with bearer auth, JSON/multipart/bytes helpers,
//! the artifact endpoints (list, upload, download, delete), a read-through
//! listing cache, and the `ArtifactManager` that ties them together for a
//! single chat session. The CLI uses this crate directly.

pub mod api;
pub mod cache;
pub mod orchestrator;

use std::time::Duration;

use artifex_core::error::{ArtifactError, Result};
use artifex_core::{ClientConfig, RouteStyle, SessionContext};
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

/// HTTP client for the artifact API.
///
/// Holds no credential: every call takes the bearer token from the
/// `SessionContext` it is made for.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    route_style: RouteStyle,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, route_style: RouteStyle) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ArtifactError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            route_style,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.api_url, config.request_timeout(), config.route_style)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn route_style(&self) -> RouteStyle {
        self.route_style
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", token))
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<T> {
        let mut request = self.apply_auth(self.client.get(self.build_url(path)), token);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ArtifactError::InvalidResponse(format!("Failed to parse response as JSON: {}", e)))
    }

    /// GET request returning the raw body.
    pub async fn get_bytes(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<Bytes> {
        let mut request = self.apply_auth(self.client.get(self.build_url(path)), token);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = send(request).await?;
        response
            .bytes()
            .await
            .map_err(|e| ArtifactError::Transport(format!("Failed to read response body: {}", e)))
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        token: &str,
    ) -> Result<T> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).multipart(form), token);

        let response = send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ArtifactError::InvalidResponse(format!("Failed to parse response as JSON: {}", e)))
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str, token: &str) -> Result<()> {
        let request = self.apply_auth(self.client.delete(self.build_url(path)), token);
        send(request).await?;
        Ok(())
    }
}

/// The bearer credential of `ctx`, or `Unauthenticated` before any request is built.
pub(crate) fn require_token(ctx: &SessionContext) -> Result<&str> {
    ctx.token().ok_or(ArtifactError::Unauthenticated)
}

async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| ArtifactError::Transport(format!("Failed to send request: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ArtifactError::Api {
            status: status.as_u16(),
            message: error_message(&error_text),
        });
    }

    Ok(response)
}

/// FastAPI-style `{"detail": "..."}` bodies collapse to the detail text;
/// anything else is kept verbatim.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

// Re-export domain types for convenience.
pub use api::ArtifactRoutes;
pub use artifex_core::models::{ArtifactMetadata, UploadReceipt};
pub use cache::{ArtifactCache, CacheKey};
pub use orchestrator::{ArtifactManager, BatchUpload};
