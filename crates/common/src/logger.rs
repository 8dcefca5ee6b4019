use crate::error::EmbedSearchError;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// File name used under `LOG_DIR`
pub const LOG_FILE_NAME: &str = "embedsearch.log";

/// Console + file logging for the `embedsearch` binary
///
/// Stdout carries the insert confirmation and the ranked listing, so every
/// log line goes to stderr. A copy without ANSI colours is appended to
/// `LOG_DIR/embedsearch.log`, which keeps divergence warnings and skipped-row
/// reports from earlier runs around.
///
/// `log_level` is any `EnvFilter` directive (`info`, `embedsearch_vector=debug`);
/// `RUST_LOG` overrides it.
pub fn setup_logging(log_dir: &Path, log_level: &str) -> Result<(), EmbedSearchError> {
    let (log_file, log_file_path) = open_log_file(log_dir)?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(level_filter(log_level));

    let file_layer = fmt::layer()
        .with_writer(log_file)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(level_filter(log_level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| EmbedSearchError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!("Logging to stderr and {} (level {})", log_file_path.display(), log_level);

    Ok(())
}

/// Stderr-only logging, used when `LOG_DIR` is unset
pub fn setup_console_logging(log_level: &str) -> Result<(), EmbedSearchError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_env_filter(level_filter(log_level))
        .try_init()
        .map_err(|e| EmbedSearchError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!("Logging to stderr (level {})", log_level);

    Ok(())
}

fn level_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Create `log_dir` if needed and open the log file for appending
fn open_log_file(log_dir: &Path) -> Result<(File, PathBuf), EmbedSearchError> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        EmbedSearchError::config(format!(
            "Failed to create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let path = log_dir.join(LOG_FILE_NAME);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| {
            EmbedSearchError::config(format!("Failed to open log file {}: {}", path.display(), e))
        })?;

    Ok((file, path))
}
