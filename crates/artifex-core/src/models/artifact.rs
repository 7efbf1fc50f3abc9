use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Prefix the backend puts in front of user-scoped artifact names.
pub const USER_NAMESPACE_PREFIX: &str = "user:";

/// Visibility scope of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Visible within the owning chat session only
    #[default]
    Session,
    /// Shared across all sessions of the user
    User,
}

impl Namespace {
    /// Server-side artifact name for a display filename in this namespace.
    pub fn artifact_name(self, filename: &str) -> String {
        match self {
            Namespace::Session => filename.to_string(),
            Namespace::User => format!("{}{}", USER_NAMESPACE_PREFIX, filename),
        }
    }

    /// Namespace implied by a server-side artifact name.
    pub fn of_artifact(artifact_name: &str) -> Self {
        if artifact_name.starts_with(USER_NAMESPACE_PREFIX) {
            Namespace::User
        } else {
            Namespace::Session
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Session => "session",
            Namespace::User => "user",
        }
    }
}

impl FromStr for Namespace {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "session" => Ok(Namespace::Session),
            "user" => Ok(Namespace::User),
            _ => Err(anyhow::anyhow!("Invalid namespace: {}", s)),
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Display filename for an artifact name, with the `user:` prefix removed.
pub fn display_name(artifact_name: &str) -> &str {
    artifact_name
        .strip_prefix(USER_NAMESPACE_PREFIX)
        .unwrap_or(artifact_name)
}

/// Server-reported description of a stored artifact.
///
/// `versions` arrives newest first. The backend guarantees
/// `latest_version == max(versions)` and `version_count == versions.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub filename: String,
    pub artifact_name: String,
    pub namespace: Namespace,
    pub mime_type: String,
    pub size: u64,
    pub version_count: usize,
    pub latest_version: u32,
    #[serde(default)]
    pub versions: Vec<u32>,
}

impl ArtifactMetadata {
    pub fn is_consistent(&self) -> bool {
        self.version_count == self.versions.len()
            && self.versions.iter().max().copied().unwrap_or(0) == self.latest_version
    }

    /// Filename to save a download under.
    pub fn save_filename(&self) -> &str {
        display_name(&self.filename)
    }
}

/// Created-artifact descriptor returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default = "default_success")]
    pub success: bool,
    pub filename: String,
    pub artifact_name: String,
    pub namespace: Namespace,
    pub mime_type: String,
    pub size: u64,
    pub version: u32,
    #[serde(default)]
    pub uploaded_at: Option<NaiveDateTime>,
}

fn default_success() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_user_prefix() {
        assert_eq!(display_name("user:report.pdf"), "report.pdf");
        assert_eq!(display_name("report.pdf"), "report.pdf");
        // Only the leading prefix is stripped
        assert_eq!(display_name("notes-user:1.txt"), "notes-user:1.txt");
    }

    #[test]
    fn test_namespace_artifact_names() {
        assert_eq!(Namespace::User.artifact_name("a.png"), "user:a.png");
        assert_eq!(Namespace::Session.artifact_name("a.png"), "a.png");
        assert_eq!(Namespace::of_artifact("user:a.png"), Namespace::User);
        assert_eq!(Namespace::of_artifact("a.png"), Namespace::Session);
        assert_eq!("USER".parse::<Namespace>().unwrap(), Namespace::User);
        assert!("global".parse::<Namespace>().is_err());
    }

    #[test]
    fn test_metadata_deserializes_backend_shape() {
        let json = r#"{
            "filename": "report.pdf",
            "artifact_name": "user:report.pdf",
            "namespace": "user",
            "mime_type": "application/pdf",
            "size": 2048,
            "version_count": 3,
            "latest_version": 2,
            "versions": [2, 1, 0]
        }"#;
        let metadata: ArtifactMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.namespace, Namespace::User);
        assert!(metadata.is_consistent());
        assert_eq!(metadata.save_filename(), "report.pdf");
    }

    #[test]
    fn test_metadata_inconsistency_detected() {
        let metadata = ArtifactMetadata {
            filename: "a.txt".to_string(),
            artifact_name: "a.txt".to_string(),
            namespace: Namespace::Session,
            mime_type: "text/plain".to_string(),
            size: 1,
            version_count: 2,
            latest_version: 5,
            versions: vec![1, 0],
        };
        assert!(!metadata.is_consistent());
    }

    #[test]
    fn test_receipt_accepts_naive_timestamp() {
        let json = r#"{
            "success": true,
            "filename": "a.png",
            "artifact_name": "a.png",
            "namespace": "session",
            "mime_type": "image/png",
            "size": 10,
            "version": 0,
            "uploaded_at": "2024-05-01T10:20:30.123456"
        }"#;
        let receipt: UploadReceipt = serde_json::from_str(json).unwrap();
        assert!(receipt.success);
        assert!(receipt.uploaded_at.is_some());
    }
}
