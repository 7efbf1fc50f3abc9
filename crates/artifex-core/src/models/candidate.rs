use std::io;
use std::path::{Component, Path};

use bytes::Bytes;

use crate::error::{ArtifactError, Result};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A user-selected file, prior to validation and upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub content: Bytes,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            mime_type: mime_type.into(),
            content,
        }
    }

    /// Read a local file. The MIME type is derived from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_path_within(path, None)
    }

    /// Like `from_path`, but a file larger than `max_size` is not read: the
    /// candidate carries the on-disk size and empty content, so validation
    /// rejects it without the payload ever being loaded.
    pub fn from_path_within(path: &Path, max_size: Option<u64>) -> Result<Self> {
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(ArtifactError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid input: {}", path.display()),
            )));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ArtifactError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid filename: {}", path.display()),
                ))
            })?
            .to_string();
        let mime_type = guess_content_type(&name).to_string();

        let size = std::fs::metadata(path)?.len();
        if max_size.is_some_and(|max| size > max) {
            return Ok(Self {
                name,
                size,
                mime_type,
                content: Bytes::new(),
            });
        }

        let content = std::fs::read(path)?;
        Ok(Self::new(name, mime_type, content))
    }
}

/// Best-effort MIME type for a filename, from its extension.
pub fn guess_content_type(filename: &str) -> &'static str {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .and_then(|ext| content_type_for_extension(&ext))
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    let content_type = match extension {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        // Videos
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        // Documents
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        _ => return None,
    };
    Some(content_type)
}
