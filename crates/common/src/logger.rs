use crate::error::ListingSmithError;
use std::path::Path;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Log file name inside the log directory
pub const LOG_FILE_NAME: &str = "listingsmith.log";

/// Initialize logging system
///
/// Console output goes to stderr so that stdout only ever carries generated
/// HTML. When `log_dir` is given, records are also appended to
/// `listingsmith.log` inside it.
///
/// # Arguments
/// * `log_level` - Log level (trace, debug, info, warn, error)
/// * `log_dir` - Optional directory for the log file
pub fn setup_logging(log_level: &str, log_dir: Option<&Path>) -> Result<(), ListingSmithError> {
    // Environment filter setup (RUST_LOG env var takes precedence)
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    // Console output layer
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter.clone());

    let file_layer = match log_dir {
        Some(dir) => {
            let log_file_path = dir.join(LOG_FILE_NAME);
            let log_file = open_log_file(dir, &log_file_path)?;

            Some(
                fmt::layer()
                    .with_writer(std::sync::Mutex::new(log_file))
                    .with_target(true)
                    .with_line_number(true)
                    .with_ansi(false) // Remove ANSI color codes in files
                    .with_span_events(FmtSpan::CLOSE)
                    .with_filter(env_filter),
            )
        }
        None => None,
    };

    // Initialize subscriber
    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ListingSmithError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(
        "Logging initialized: level={}, log_dir={}",
        log_level,
        log_dir.map(|d| d.display().to_string()).unwrap_or_else(|| "-".to_string())
    );

    Ok(())
}

fn open_log_file(dir: &Path, path: &Path) -> Result<std::fs::File, ListingSmithError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| {
            ListingSmithError::config(format!(
                "Failed to create log directory {}: {}",
                dir.display(),
                e
            ))
        })?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            ListingSmithError::config(format!(
                "Failed to open log file {}: {}",
                path.display(),
                e
            ))
        })
}
