//! Data models for the artifact pipeline
//!
//! Each sub-module covers one entity: selected files, server-side artifacts,
//! and the transient upload tasks shown by the UI.

mod artifact;
mod candidate;
mod task;

pub use artifact::{display_name, ArtifactMetadata, Namespace, UploadReceipt, USER_NAMESPACE_PREFIX};
pub use candidate::{guess_content_type, FileCandidate, DEFAULT_CONTENT_TYPE};
pub use task::{
    OperationOutcome, OutcomeStatus, TaskBoard, TaskPhase, UploadTask, ERROR_DISPLAY,
    SUCCESS_DISPLAY,
};
