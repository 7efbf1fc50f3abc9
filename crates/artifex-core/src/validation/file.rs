use crate::models::FileCandidate;

use super::rule::ValidationRule;

/// Reasons a candidate or batch is rejected before upload.
///
/// `Display` yields the user-facing message shown next to the upload control.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File size must be less than {max_mb}MB")]
    FileTooLarge { size: u64, max_mb: u64 },

    #[error("File type {mime_type} is not allowed")]
    TypeNotAllowed { mime_type: String },

    #[error("Maximum {max} files allowed")]
    TooManyFiles { max: usize },
}

/// Check one candidate against a rule, size first.
pub fn check_file(candidate: &FileCandidate, rule: &ValidationRule) -> Result<(), ValidationError> {
    if let Some(max_size) = rule.max_size {
        if candidate.size > max_size {
            return Err(ValidationError::FileTooLarge {
                size: candidate.size,
                max_mb: rule.max_size_mb().unwrap_or_default(),
            });
        }
    }

    if !rule.accepts_type(&candidate.mime_type) {
        let mime_type = if candidate.mime_type.is_empty() {
            "unknown".to_string()
        } else {
            candidate.mime_type.clone()
        };
        return Err(ValidationError::TypeNotAllowed { mime_type });
    }

    Ok(())
}

/// Validate one candidate. Returns the user-facing error, if any.
pub fn validate_file(candidate: &FileCandidate, rule: &ValidationRule) -> Option<String> {
    check_file(candidate, rule).err().map(|e| e.to_string())
}

/// Outcome of validating a batch: the accepted subset plus indexed errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchValidation {
    pub valid: Vec<FileCandidate>,
    pub errors: Vec<String>,
}

impl BatchValidation {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Validate a batch.
///
/// An oversized batch is rejected as a whole with a single error before any
/// per-file check. Otherwise each candidate is checked on its own and failures
/// are reported as `File {n}: {reason}` with 1-based positions.
pub fn validate_files(candidates: Vec<FileCandidate>, rule: &ValidationRule) -> BatchValidation {
    if let Some(max) = rule.max_files {
        if candidates.len() > max {
            tracing::debug!(count = candidates.len(), max, "Batch exceeds file limit");
            return BatchValidation {
                valid: Vec::new(),
                errors: vec![ValidationError::TooManyFiles { max }.to_string()],
            };
        }
    }

    let mut result = BatchValidation::default();
    for (index, candidate) in candidates.into_iter().enumerate() {
        match check_file(&candidate, rule) {
            Ok(()) => result.valid.push(candidate),
            Err(e) => {
                tracing::debug!(file = %candidate.name, error = %e, "File rejected");
                result.errors.push(format!("File {}: {}", index + 1, e));
            }
        }
    }
    result
}
