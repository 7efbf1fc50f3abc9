//! Artifact endpoints of the API client.
//!
//! All paths are rooted at `/apps/{app}/users/{user}/sessions/{session}`.
//! Every method checks for a bearer credential first and fails with
//! `Unauthenticated` without touching the network when there is none.

use artifex_core::context::encode_segment;
use artifex_core::error::{ArtifactError, Result};
use artifex_core::models::{
    guess_content_type, ArtifactMetadata, FileCandidate, Namespace, UploadReceipt,
};
use artifex_core::{RouteStyle, SessionContext};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::{require_token, ApiClient};

/// Path builder for one route style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactRoutes {
    style: RouteStyle,
}

impl ArtifactRoutes {
    pub fn new(style: RouteStyle) -> Self {
        Self { style }
    }

    pub fn list(&self, ctx: &SessionContext) -> String {
        match self.style {
            RouteStyle::Rest => format!("{}/artifacts", ctx.session_path()),
            RouteStyle::Legacy => format!("{}/artifacts-metadata", ctx.session_path()),
        }
    }

    pub fn upload(&self, ctx: &SessionContext) -> String {
        match self.style {
            RouteStyle::Rest => format!("{}/artifacts", ctx.session_path()),
            RouteStyle::Legacy => format!("{}/upload", ctx.session_path()),
        }
    }

    pub fn download(&self, ctx: &SessionContext, artifact_name: &str) -> String {
        match self.style {
            RouteStyle::Rest => self.artifact(ctx, artifact_name),
            RouteStyle::Legacy => format!("{}/download", self.artifact(ctx, artifact_name)),
        }
    }

    pub fn delete(&self, ctx: &SessionContext, artifact_name: &str) -> String {
        self.artifact(ctx, artifact_name)
    }

    fn artifact(&self, ctx: &SessionContext, artifact_name: &str) -> String {
        format!(
            "{}/artifacts/{}",
            ctx.session_path(),
            encode_segment(artifact_name)
        )
    }
}

impl ApiClient {
    pub fn routes(&self) -> ArtifactRoutes {
        ArtifactRoutes::new(self.route_style())
    }

    /// List artifact metadata for the session.
    pub async fn list_artifacts(&self, ctx: &SessionContext) -> Result<Vec<ArtifactMetadata>> {
        let token = require_token(ctx)?;
        self.get_json(&self.routes().list(ctx), &[], token).await
    }

    /// Upload one file into the given namespace, optionally under another name.
    pub async fn upload_artifact(
        &self,
        ctx: &SessionContext,
        candidate: &FileCandidate,
        namespace: Namespace,
        custom_filename: Option<&str>,
    ) -> Result<UploadReceipt> {
        let token = require_token(ctx)?;

        let mut form = Form::new()
            .part("file", file_part(candidate)?)
            .text("namespace", namespace.as_str());
        if let Some(name) = custom_filename {
            form = form.text("custom_filename", name.to_string());
        }

        self.post_multipart(&self.routes().upload(ctx), form, token)
            .await
    }

    /// Fetch the payload of an artifact; latest version unless `version` is given.
    pub async fn download_artifact(
        &self,
        ctx: &SessionContext,
        artifact_name: &str,
        version: Option<u32>,
    ) -> Result<Bytes> {
        let token = require_token(ctx)?;

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(v) = version {
            query.push(("version", v.to_string()));
        }

        self.get_bytes(&self.routes().download(ctx, artifact_name), &query, token)
            .await
    }

    /// Delete an artifact (all versions).
    pub async fn delete_artifact(&self, ctx: &SessionContext, artifact_name: &str) -> Result<()> {
        let token = require_token(ctx)?;
        self.delete(&self.routes().delete(ctx, artifact_name), token)
            .await
    }
}

/// Multipart part for a candidate. A blank or unparsable declared type is
/// replaced by the one derived from the file name.
fn file_part(candidate: &FileCandidate) -> Result<Part> {
    let part = || Part::bytes(candidate.content.to_vec()).file_name(candidate.name.clone());

    let declared = candidate.mime_type.trim();
    if !declared.is_empty() {
        if let Ok(typed) = part().mime_str(declared) {
            return Ok(typed);
        }
    }

    let guessed = guess_content_type(&candidate.name);
    debug!(
        file = %candidate.name,
        declared = %candidate.mime_type,
        content_type = guessed,
        "Falling back to content type derived from file name"
    );
    part()
        .mime_str(guessed)
        .map_err(|e| ArtifactError::Config(format!("Invalid content type {}: {}", guessed, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn ctx() -> SessionContext {
        SessionContext::new("agent", "u1", "s1").with_token("tok")
    }

    fn client(url: &str, style: RouteStyle) -> ApiClient {
        ApiClient::new(url, Duration::from_secs(5), style).unwrap()
    }

    #[test]
    fn test_rest_routes() {
        let routes = ArtifactRoutes::new(RouteStyle::Rest);
        let ctx = ctx();
        assert_eq!(routes.list(&ctx), "/apps/agent/users/u1/sessions/s1/artifacts");
        assert_eq!(routes.upload(&ctx), "/apps/agent/users/u1/sessions/s1/artifacts");
        assert_eq!(
            routes.download(&ctx, "user:report.pdf"),
            "/apps/agent/users/u1/sessions/s1/artifacts/user%3Areport.pdf"
        );
        assert_eq!(
            routes.delete(&ctx, "a b.txt"),
            "/apps/agent/users/u1/sessions/s1/artifacts/a%20b.txt"
        );
    }

    #[test]
    fn test_legacy_routes() {
        let routes = ArtifactRoutes::new(RouteStyle::Legacy);
        let ctx = ctx();
        assert_eq!(
            routes.list(&ctx),
            "/apps/agent/users/u1/sessions/s1/artifacts-metadata"
        );
        assert_eq!(routes.upload(&ctx), "/apps/agent/users/u1/sessions/s1/upload");
        assert_eq!(
            routes.download(&ctx, "a.txt"),
            "/apps/agent/users/u1/sessions/s1/artifacts/a.txt/download"
        );
        assert_eq!(
            routes.delete(&ctx, "a.txt"),
            "/apps/agent/users/u1/sessions/s1/artifacts/a.txt"
        );
    }

    #[tokio::test]
    async fn test_list_artifacts_sends_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/apps/agent/users/u1/sessions/s1/artifacts")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"filename":"a.txt","artifact_name":"a.txt","namespace":"session",
                    "mime_type":"text/plain","size":3,"version_count":1,
                    "latest_version":0,"versions":[0]}]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let artifacts = client(&server.url(), RouteStyle::Rest)
            .list_artifacts(&ctx())
            .await
            .unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].filename, "a.txt");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/apps/agent/users/u1/sessions/s1/upload")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="notes.txt""#.to_string()),
                Matcher::Regex(r#"name="namespace"\r\n\r\nuser"#.to_string()),
                Matcher::Regex(r#"name="custom_filename"\r\n\r\nrenamed.txt"#.to_string()),
                Matcher::Regex("hello world".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success":true,"filename":"renamed.txt","artifact_name":"user:renamed.txt",
                    "namespace":"user","mime_type":"text/plain","size":11,"version":0,
                    "uploaded_at":"2024-05-01T10:20:30.123456"}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let candidate = FileCandidate::new("notes.txt", "text/plain", b"hello world".to_vec());
        let receipt = client(&server.url(), RouteStyle::Legacy)
            .upload_artifact(&ctx(), &candidate, Namespace::User, Some("renamed.txt"))
            .await
            .unwrap();

        assert_eq!(receipt.artifact_name, "user:renamed.txt");
        assert_eq!(receipt.namespace, Namespace::User);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unparsable_type_falls_back_to_file_name() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/apps/agent/users/u1/sessions/s1/artifacts")
            .match_body(Matcher::Regex("(?i)content-type: text/plain".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success":true,"filename":"notes.txt","artifact_name":"notes.txt",
                    "namespace":"session","mime_type":"text/plain","size":5,"version":0}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let candidate = FileCandidate::new("notes.txt", "not a mime", b"hello".to_vec());
        let receipt = client(&server.url(), RouteStyle::Rest)
            .upload_artifact(&ctx(), &candidate, Namespace::Session, None)
            .await
            .unwrap();

        assert_eq!(receipt.mime_type, "text/plain");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_download_passes_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/apps/agent/users/u1/sessions/s1/artifacts/a.txt")
            .match_query(Matcher::UrlEncoded("version".into(), "2".into()))
            .with_status(200)
            .with_body("v2 contents")
            .expect(1)
            .create_async()
            .await;

        let body = client(&server.url(), RouteStyle::Rest)
            .download_artifact(&ctx(), "a.txt", Some(2))
            .await
            .unwrap();

        assert_eq!(body, Bytes::from_static(b"v2 contents"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_carries_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/apps/agent/users/u1/sessions/s1/artifacts/missing.txt")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"Artifact not found"}"#)
            .create_async()
            .await;

        let err = client(&server.url(), RouteStyle::Rest)
            .delete_artifact(&ctx(), "missing.txt")
            .await
            .unwrap_err();

        match err {
            ArtifactError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Artifact not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let anonymous = SessionContext::new("agent", "u1", "s1");
        let err = client(&server.url(), RouteStyle::Rest)
            .list_artifacts(&anonymous)
            .await
            .unwrap_err();

        assert!(matches!(err, ArtifactError::Unauthenticated));
        mock.assert_async().await;
    }
}
