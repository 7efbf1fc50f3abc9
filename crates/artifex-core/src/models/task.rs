use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::artifact::{Namespace, UploadReceipt};
use super::candidate::FileCandidate;

/// How long a settled task stays visible before the UI drops it.
pub const SUCCESS_DISPLAY: Duration = Duration::from_secs(2);
pub const ERROR_DISPLAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPhase {
    Pending,
    Success,
    Error,
}

impl TaskPhase {
    /// Display delay after the phase settles. `None` while pending.
    pub fn display_duration(self) -> Option<Duration> {
        match self {
            TaskPhase::Pending => None,
            TaskPhase::Success => Some(SUCCESS_DISPLAY),
            TaskPhase::Error => Some(ERROR_DISPLAY),
        }
    }
}

/// State of one upload, from dispatch until the UI clears it.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: Uuid,
    pub candidate: FileCandidate,
    pub namespace: Namespace,
    pub phase: TaskPhase,
    pub error: Option<String>,
    pub receipt: Option<UploadReceipt>,
    settled_at: Option<Instant>,
}

impl UploadTask {
    pub fn pending(candidate: FileCandidate, namespace: Namespace) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate,
            namespace,
            phase: TaskPhase::Pending,
            error: None,
            receipt: None,
            settled_at: None,
        }
    }

    pub fn succeed(&mut self, receipt: UploadReceipt) {
        self.phase = TaskPhase::Success;
        self.receipt = Some(receipt);
        self.error = None;
        self.settled_at = Some(Instant::now());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = TaskPhase::Error;
        self.error = Some(message.into());
        self.receipt = None;
        self.settled_at = Some(Instant::now());
    }

    pub fn file_name(&self) -> &str {
        &self.candidate.name
    }

    pub fn is_settled(&self) -> bool {
        self.phase != TaskPhase::Pending
    }

    /// Whether the display delay of a settled task has elapsed at `now`.
    pub fn should_clear(&self, now: Instant) -> bool {
        match (self.settled_at, self.phase.display_duration()) {
            (Some(settled_at), Some(delay)) => now.saturating_duration_since(settled_at) >= delay,
            _ => false,
        }
    }

    pub fn outcome(&self) -> OperationOutcome {
        match self.phase {
            TaskPhase::Pending => OperationOutcome {
                status: OutcomeStatus::Pending,
                detail: format!("Uploading {}", self.file_name()),
            },
            TaskPhase::Success => OperationOutcome::success(format!(
                "Uploaded {} (version {})",
                self.file_name(),
                self.receipt.as_ref().map(|r| r.version).unwrap_or_default()
            )),
            TaskPhase::Error => OperationOutcome::error(format!(
                "{}: {}",
                self.file_name(),
                self.error.as_deref().unwrap_or("Upload failed")
            )),
        }
    }
}

/// Visible upload tasks of one upload surface.
///
/// A new attempt for a file name replaces the settled task for that name;
/// uploads of the same name still in flight are kept side by side. Settled
/// tasks disappear once their display delay has elapsed.
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<UploadTask>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, task: UploadTask) {
        self.tasks
            .retain(|t| !(t.is_settled() && t.file_name() == task.file_name()));
        self.tasks.push(task);
    }

    /// Replace the task with the same id. Unknown ids are ignored.
    pub fn update(&mut self, task: &UploadTask) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task.clone();
        }
    }

    pub fn prune(&mut self, now: Instant) {
        self.tasks.retain(|t| !t.should_clear(now));
    }

    pub fn tasks(&self) -> &[UploadTask] {
        &self.tasks
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_settled()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Pending,
    Success,
    Error,
}

/// Status + detail reported back to the invoking surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub status: OutcomeStatus,
    pub detail: String,
}

impl OperationOutcome {
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            detail: detail.into(),
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
