use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

pub const BYTES_PER_MB: u64 = 1024 * 1024;

const IMAGES_MAX_SIZE_MB: u64 = 10;
const DOCUMENTS_MAX_SIZE_MB: u64 = 50;
const GENERAL_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_FILES: usize = 10;

const DOCUMENT_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "text/plain",
    "text/markdown",
    "text/csv",
    "application/json",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Size/type/count constraints for one upload surface.
///
/// `None` and an empty `allowed_types` impose no restriction. Entries in
/// `allowed_types` are exact MIME types or a `category/*` wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationRule {
    pub max_size: Option<u64>,
    pub allowed_types: Vec<String>,
    pub max_files: Option<usize>,
}

impl ValidationRule {
    /// Rule with no constraints at all.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    pub fn with_max_size_mb(self, mb: u64) -> Self {
        self.with_max_size(mb * BYTES_PER_MB)
    }

    pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_files(mut self, max: usize) -> Self {
        self.max_files = Some(max);
        self
    }

    /// Whether `mime_type` is admitted by `allowed_types`.
    pub fn accepts_type(&self, mime_type: &str) -> bool {
        if self.allowed_types.is_empty() {
            return true;
        }

        let candidate = mime_type.trim().to_ascii_lowercase();
        self.allowed_types.iter().any(|allowed| {
            let allowed = allowed.trim().to_ascii_lowercase();
            if allowed == "*/*" || allowed == "*" {
                return true;
            }
            match allowed.strip_suffix("/*") {
                Some(category) => candidate
                    .split_once('/')
                    .is_some_and(|(c, subtype)| c == category && !subtype.is_empty()),
                None => allowed == candidate,
            }
        })
    }

    /// Size ceiling in whole megabytes, rounded to the nearest MB.
    pub fn max_size_mb(&self) -> Option<u64> {
        self.max_size
            .map(|bytes| (bytes as f64 / BYTES_PER_MB as f64).round() as u64)
    }
}

/// Named rule presets used by the different upload surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePreset {
    Images,
    Documents,
    General,
}

impl RulePreset {
    pub fn rule(self) -> ValidationRule {
        match self {
            RulePreset::Images => ValidationRule::unrestricted()
                .with_max_size_mb(IMAGES_MAX_SIZE_MB)
                .with_allowed_types(["image/*"])
                .with_max_files(DEFAULT_MAX_FILES),
            RulePreset::Documents => ValidationRule::unrestricted()
                .with_max_size_mb(DOCUMENTS_MAX_SIZE_MB)
                .with_allowed_types(DOCUMENT_CONTENT_TYPES.iter().copied())
                .with_max_files(DEFAULT_MAX_FILES),
            RulePreset::General => ValidationRule::unrestricted()
                .with_max_size_mb(GENERAL_MAX_SIZE_MB)
                .with_max_files(DEFAULT_MAX_FILES),
        }
    }
}

impl From<RulePreset> for ValidationRule {
    fn from(preset: RulePreset) -> Self {
        preset.rule()
    }
}

impl FromStr for RulePreset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "images" | "image" => Ok(RulePreset::Images),
            "documents" | "document" => Ok(RulePreset::Documents),
            "general" => Ok(RulePreset::General),
            _ => Err(anyhow::anyhow!("Invalid rule preset: {}", s)),
        }
    }
}

impl Display for RulePreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RulePreset::Images => write!(f, "images"),
            RulePreset::Documents => write!(f, "documents"),
            RulePreset::General => write!(f, "general"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_type_exact_and_wildcard() {
        let rule = ValidationRule::unrestricted().with_allowed_types(["image/*", "application/pdf"]);
        assert!(rule.accepts_type("image/png"));
        assert!(rule.accepts_type("IMAGE/JPEG")); // case insensitive
        assert!(rule.accepts_type("application/pdf"));
        assert!(!rule.accepts_type("application/zip"));
        assert!(!rule.accepts_type("imagery/png"));
        assert!(!rule.accepts_type("image/"));
    }

    #[test]
    fn test_accepts_type_unrestricted() {
        let rule = ValidationRule::unrestricted();
        assert!(rule.accepts_type("application/x-anything"));
        assert!(rule.accepts_type(""));
    }

    #[test]
    fn test_max_size_mb_rounds() {
        assert_eq!(RulePreset::Documents.rule().max_size_mb(), Some(50));
        let rule = ValidationRule::unrestricted().with_max_size(1_600_000);
        assert_eq!(rule.max_size_mb(), Some(2));
        assert_eq!(ValidationRule::unrestricted().max_size_mb(), None);
    }

    #[test]
    fn test_presets_differ_in_size_and_types_only() {
        let images = RulePreset::Images.rule();
        let documents = RulePreset::Documents.rule();
        let general = RulePreset::General.rule();

        assert_eq!(images.max_files, documents.max_files);
        assert_eq!(documents.max_files, general.max_files);
        assert_eq!(images.allowed_types, vec!["image/*".to_string()]);
        assert!(documents.accepts_type("application/pdf"));
        assert!(!documents.accepts_type("image/png"));
        assert!(general.allowed_types.is_empty());
        assert_eq!(general.max_size, Some(100 * BYTES_PER_MB));
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("images".parse::<RulePreset>().unwrap(), RulePreset::Images);
        assert_eq!("Documents".parse::<RulePreset>().unwrap(), RulePreset::Documents);
        assert_eq!("general".parse::<RulePreset>().unwrap(), RulePreset::General);
        assert!("videos".parse::<RulePreset>().is_err());
        assert_eq!(RulePreset::Documents.to_string(), "documents");
    }
}
