//! Validation modules

pub mod file;
pub mod rule;

pub use file::{check_file, validate_file, validate_files, BatchValidation, ValidationError};
pub use rule::{RulePreset, ValidationRule, BYTES_PER_MB};
