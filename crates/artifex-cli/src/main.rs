//! Artifex CLI: command-line client for session artifacts.
//!
//! Set ARTIFEX_USER_ID, ARTIFEX_SESSION_ID and ARTIFEX_TOKEN (or JWT_TOKEN);
//! ARTIFEX_API_URL (or API_URL) defaults to http://localhost:8000.

use std::path::PathBuf;

use anyhow::Context;
use artifex_api_client::{ArtifactManager, BatchUpload};
use artifex_cli::{init_tracing, render_artifact_table};
use artifex_core::models::{OperationOutcome, UploadReceipt};
use artifex_core::{validate_files, ClientConfig, FileCandidate, Namespace, RulePreset};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "artifex", about = "Artifex session artifact CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List artifacts of the session
    List {
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Upload one or more files
    Upload {
        /// Paths of the files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Target namespace: session or user
        #[arg(long, default_value = "session")]
        namespace: Namespace,
        /// Validation preset: images, documents or general
        #[arg(long, default_value = "general")]
        preset: RulePreset,
        /// Store under another name (single file only)
        #[arg(long)]
        name: Option<String>,
    },
    /// Download an artifact
    Download {
        /// Artifact name, e.g. report.pdf or user:report.pdf
        name: String,
        /// Specific version (latest when omitted)
        #[arg(long)]
        version: Option<u32>,
        /// Destination directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Delete an artifact with all its versions
    Delete {
        /// Artifact name
        name: String,
    },
    /// Check files against a preset without uploading
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "general")]
        preset: RulePreset,
    },
}

#[derive(Serialize)]
struct UploadReport {
    outcomes: Vec<OperationOutcome>,
    receipts: Vec<UploadReceipt>,
}

impl From<&BatchUpload> for UploadReport {
    fn from(batch: &BatchUpload) -> Self {
        Self {
            outcomes: batch.outcomes(),
            receipts: batch
                .tasks
                .iter()
                .filter_map(|t| t.receipt.clone())
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct ValidationReport {
    valid: Vec<String>,
    errors: Vec<String>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Files over `max_size` are only stat'ed; validation rejects them by size.
fn read_candidates(files: &[PathBuf], max_size: Option<u64>) -> anyhow::Result<Vec<FileCandidate>> {
    files
        .iter()
        .map(|path| {
            FileCandidate::from_path_within(path, max_size)
                .with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect()
}

fn manager() -> anyhow::Result<ArtifactManager> {
    let config = ClientConfig::from_env().context(
        "Failed to load configuration. Set ARTIFEX_USER_ID and ARTIFEX_SESSION_ID",
    )?;
    ArtifactManager::from_config(&config).context("Failed to create API client")
}

async fn upload(
    manager: &ArtifactManager,
    files: &[PathBuf],
    namespace: Namespace,
    preset: RulePreset,
    name: Option<String>,
) -> anyhow::Result<BatchUpload> {
    let rule = preset.rule();
    let candidates = read_candidates(files, rule.max_size)?;

    let Some(name) = name else {
        return Ok(manager.upload_batch(candidates, &rule, namespace).await);
    };

    if candidates.len() != 1 {
        anyhow::bail!("--name can only be used with a single file");
    }

    let validation = validate_files(candidates, &rule);
    let mut batch = BatchUpload {
        tasks: Vec::new(),
        errors: validation.errors,
    };
    for candidate in validation.valid {
        batch
            .tasks
            .push(manager.upload(candidate, namespace, Some(&name)).await);
    }
    Ok(batch)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::List { format } => {
            let artifacts = manager()?.list().await?;
            match format.as_str() {
                "json" => print_json(&artifacts)?,
                _ => print!("{}", render_artifact_table(&artifacts)),
            }
        }
        Commands::Upload {
            files,
            namespace,
            preset,
            name,
        } => {
            let manager = manager()?;
            let batch = upload(&manager, &files, namespace, preset, name).await?;
            print_json(&UploadReport::from(&batch))?;

            let rejected = batch.failed() + batch.errors.len();
            if rejected > 0 {
                anyhow::bail!("{} of {} files were not uploaded", rejected, files.len());
            }
        }
        Commands::Download { name, version, out } => {
            let path = manager()?
                .download(&name, version, &out)
                .await
                .with_context(|| format!("Failed to download {}", name))?;
            print_json(&OperationOutcome::success(format!(
                "Saved {}",
                path.display()
            )))?;
        }
        Commands::Delete { name } => {
            manager()?
                .delete(&name)
                .await
                .with_context(|| format!("Failed to delete {}", name))?;
            print_json(&OperationOutcome::success(format!("Deleted {}", name)))?;
        }
        Commands::Validate { files, preset } => {
            let rule = preset.rule();
            let result = validate_files(read_candidates(&files, rule.max_size)?, &rule);
            let has_errors = result.has_errors();
            print_json(&ValidationReport {
                valid: result.valid.into_iter().map(|c| c.name).collect(),
                errors: result.errors,
            })?;
            if has_errors {
                anyhow::bail!("Validation failed for preset {}", preset);
            }
        }
    }

    Ok(())
}
