//! Artifex Core Library
//!
//! This crate provides the domain models, error types, configuration, validation,
//! source extraction and drag tracking shared by the Artifex API client and CLI.
//! Nothing in here touches the network.

pub mod config;
pub mod context;
pub mod drag;
pub mod error;
pub mod models;
pub mod source;
pub mod validation;

// Re-export commonly used types
pub use config::{ClientConfig, RouteStyle};
pub use context::{SessionContext, Theme};
pub use drag::{DragState, DragTracker, DropOutcome, Point, Rect};
pub use error::{ArtifactError, LogLevel};
pub use models::{
    ArtifactMetadata, FileCandidate, Namespace, OperationOutcome, TaskPhase, UploadReceipt,
    UploadTask,
};
pub use source::{extract_files, DataTransfer, DropEvent, FileList, FileSource};
pub use validation::{validate_file, validate_files, BatchValidation, RulePreset, ValidationRule};
