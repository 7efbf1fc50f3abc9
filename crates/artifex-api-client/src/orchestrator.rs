//! Session-scoped artifact operations.
//!
//! `ArtifactManager` binds an `ApiClient`, the shared listing cache and one
//! `SessionContext`. Uploads are tracked as `UploadTask`s on a task board;
//! every mutation (upload success, delete, failed download) invalidates the
//! session's listing so the next read goes back to the server.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use artifex_core::error::{ArtifactError, LogLevel, Result};
use artifex_core::models::{display_name, OperationOutcome, TaskBoard};
use artifex_core::{
    extract_files, validate_files, ArtifactMetadata, ClientConfig, FileCandidate, FileSource,
    Namespace, SessionContext, TaskPhase, UploadTask, ValidationRule,
};
use futures::future::join_all;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::cache::{ArtifactCache, CacheKey};
use crate::ApiClient;

/// Result of a multi-file upload: one task per accepted file plus the
/// validation errors of the rejected ones.
#[derive(Debug, Clone, Default)]
pub struct BatchUpload {
    pub tasks: Vec<UploadTask>,
    pub errors: Vec<String>,
}

impl BatchUpload {
    pub fn succeeded(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.phase == TaskPhase::Success)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.tasks.len() - self.succeeded()
    }

    /// Task outcomes followed by one error outcome per validation error.
    pub fn outcomes(&self) -> Vec<OperationOutcome> {
        self.tasks
            .iter()
            .map(UploadTask::outcome)
            .chain(self.errors.iter().map(OperationOutcome::error))
            .collect()
    }
}

#[derive(Clone)]
pub struct ArtifactManager {
    client: ApiClient,
    cache: ArtifactCache,
    context: SessionContext,
    tasks: Arc<Mutex<TaskBoard>>,
}

impl ArtifactManager {
    pub fn new(client: ApiClient, cache: ArtifactCache, context: SessionContext) -> Self {
        Self {
            client,
            cache,
            context,
            tasks: Arc::new(Mutex::new(TaskBoard::new())),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = ApiClient::from_config(config)?;
        let cache = ArtifactCache::new(config.cache_stale_window());
        Ok(Self::new(client, cache, config.session_context()))
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    fn cache_key(&self) -> CacheKey {
        CacheKey::for_context(&self.context)
    }

    /// Artifact listing of the session, served from cache while fresh.
    pub async fn list(&self) -> Result<Vec<ArtifactMetadata>> {
        self.cache
            .get_or_fetch(&self.cache_key(), || self.client.list_artifacts(&self.context))
            .await
    }

    /// Drop the cached listing and fetch it again.
    pub async fn refresh(&self) -> Result<Vec<ArtifactMetadata>> {
        self.cache.invalidate(&self.cache_key()).await;
        self.list().await
    }

    /// Upload one file. Failures end up in the returned task, never as `Err`.
    pub async fn upload(
        &self,
        candidate: FileCandidate,
        namespace: Namespace,
        custom_filename: Option<&str>,
    ) -> UploadTask {
        let mut task = UploadTask::pending(candidate, namespace);
        self.tasks.lock().await.begin(task.clone());

        match self
            .client
            .upload_artifact(&self.context, &task.candidate, namespace, custom_filename)
            .await
        {
            Ok(receipt) => {
                info!(
                    session_id = %self.context.session_id,
                    artifact_name = %receipt.artifact_name,
                    version = receipt.version,
                    size = receipt.size,
                    "Artifact uploaded"
                );
                self.cache.invalidate(&self.cache_key()).await;
                task.succeed(receipt);
            }
            Err(e) => {
                log_failure("upload", task.file_name(), &e);
                task.fail(e.client_message());
            }
        }

        self.tasks.lock().await.update(&task);
        task
    }

    /// Extract, validate, then upload the accepted files concurrently.
    ///
    /// Rejected files never reach the network; accepted ones are uploaded
    /// even when others in the batch were rejected.
    pub async fn upload_batch(
        &self,
        source: impl Into<FileSource>,
        rule: &ValidationRule,
        namespace: Namespace,
    ) -> BatchUpload {
        let candidates = extract_files(source.into());
        let validation = validate_files(candidates, rule);
        if validation.has_errors() {
            debug!(
                accepted = validation.valid.len(),
                rejected = validation.errors.len(),
                "Batch validation rejected files"
            );
        }

        let tasks = join_all(
            validation
                .valid
                .into_iter()
                .map(|candidate| self.upload(candidate, namespace, None)),
        )
        .await;

        BatchUpload {
            tasks,
            errors: validation.errors,
        }
    }

    /// Download an artifact into `dest_dir`, saved under its display name.
    ///
    /// A failed download invalidates the listing so a retry starts from
    /// fresh metadata.
    pub async fn download(
        &self,
        artifact_name: &str,
        version: Option<u32>,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        match self.try_download(artifact_name, version, dest_dir).await {
            Ok(path) => {
                info!(
                    artifact_name = %artifact_name,
                    version = ?version,
                    path = %path.display(),
                    "Artifact downloaded"
                );
                Ok(path)
            }
            Err(e) => {
                log_failure("download", artifact_name, &e);
                self.cache.invalidate(&self.cache_key()).await;
                Err(e)
            }
        }
    }

    async fn try_download(
        &self,
        artifact_name: &str,
        version: Option<u32>,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let dest = dest_dir.join(save_name(artifact_name)?);
        let data = self
            .client
            .download_artifact(&self.context, artifact_name, version)
            .await?;

        let dir = dest_dir.to_path_buf();
        tokio::task::spawn_blocking(move || write_file(&dir, dest, &data))
            .await
            .map_err(|e| ArtifactError::Io(io::Error::other(e)))?
    }

    /// Delete an artifact, then invalidate the listing. Nothing is removed
    /// locally; the next read reflects the server.
    pub async fn delete(&self, artifact_name: &str) -> Result<()> {
        let result = self
            .client
            .delete_artifact(&self.context, artifact_name)
            .await;
        self.cache.invalidate(&self.cache_key()).await;

        match &result {
            Ok(()) => info!(artifact_name = %artifact_name, "Artifact deleted"),
            Err(e) => log_failure("delete", artifact_name, e),
        }
        result
    }

    /// Tasks still on display; expired ones are dropped first.
    pub async fn tasks(&self) -> Vec<UploadTask> {
        let mut board = self.tasks.lock().await;
        board.prune(Instant::now());
        board.tasks().to_vec()
    }
}

/// Local file name for an artifact: the display name, reduced to its last
/// path component.
fn save_name(artifact_name: &str) -> Result<String> {
    Path::new(display_name(artifact_name))
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            ArtifactError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Artifact name has no usable file name: {}", artifact_name),
            ))
        })
}

/// Write through a temporary file in `dir` and rename it over `dest`.
fn write_file(dir: &Path, dest: PathBuf, data: &[u8]) -> Result<PathBuf> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(&dest).map_err(|e| ArtifactError::Io(e.error))?;
    Ok(dest)
}

fn log_failure(operation: &str, target: &str, e: &ArtifactError) {
    match e.log_level() {
        LogLevel::Debug => debug!(operation, target, error = %e, "Artifact operation failed"),
        LogLevel::Warn => warn!(
            operation,
            target,
            error_code = e.error_code(),
            error = %e,
            "Artifact operation failed"
        ),
        LogLevel::Error => error!(
            operation,
            target,
            error_code = e.error_code(),
            recoverable = e.is_recoverable(),
            error = %e,
            "Artifact operation failed"
        ),
    }
}
