use artifex_core::models::ArtifactMetadata;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn size_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Versions as shown in the listing, newest first: `v2, v1, v0`.
pub fn format_versions(versions: &[u32]) -> String {
    versions
        .iter()
        .map(|v| format!("v{}", v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Plain-text artifact table.
pub fn render_artifact_table(artifacts: &[ArtifactMetadata]) -> String {
    if artifacts.is_empty() {
        return "No artifacts found.\n".to_string();
    }

    let mut out = format!(
        "{:<30} {:<8} {:<24} {:>10} {:>8}  {}\n",
        "Filename", "Scope", "Content Type", "Size (MB)", "Latest", "Versions"
    );
    out.push_str(&"-".repeat(100));
    out.push('\n');

    for artifact in artifacts {
        out.push_str(&format!(
            "{:<30} {:<8} {:<24} {:>10.2} {:>8}  {}\n",
            truncate_string(artifact.save_filename(), 30),
            artifact.namespace,
            truncate_string(&artifact.mime_type, 24),
            size_mb(artifact.size),
            format!("v{}", artifact.latest_version),
            truncate_string(&format_versions(&artifact.versions), 30),
        ));
    }

    out
}

/// Initialize tracing for the CLI. `ARTIFEX_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("ARTIFEX_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
