//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments
//! Features:
//! - `EnvFilter` (RUST_LOG wins over the configured level)
//! - Pretty console output in development, JSON when requested
//! - Optional daily rotating file under `WORK_DIR/logs` (deleted after 14 days)

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

const LOG_FILE_PREFIX: &str = "label-server";
const LOG_RETENTION_DAYS: i64 = 14;

/// Initialize the logging system with an optional daily rotating file
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn")
/// * `json_format` - Whether to use JSON format
/// * `log_dir` - Optional directory for file logging (e.g., Some("./work_dir/logs"))
///
/// # Examples
/// ```no_run
/// # use label_server::init_logger_with_file;
/// # use std::path::Path;
/// // Development setup (console only)
/// init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + file)
/// init_logger_with_file("info", true, Some(Path::new("./work_dir/logs")))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            let layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(appender));

            tokio::spawn(periodic_cleanup(dir.to_path_buf()));

            Some(if json_format {
                layer.json().with_current_span(true).boxed()
            } else {
                layer.boxed()
            })
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Delete rotated log files older than 14 days
///
/// Rotated files are named `label-server.YYYY-MM-DD`.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(LOG_RETENTION_DAYS);

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if let Some(date) = log_file_date(name)
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(())
}

fn log_file_date(name: &str) -> Option<chrono::NaiveDate> {
    let date = name.strip_prefix(LOG_FILE_PREFIX)?.strip_prefix('.')?;
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Periodic cleanup task - runs every hour to clean old logs
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
        sleep(Duration::from_secs(3600)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_date() {
        assert_eq!(
            log_file_date("label-server.2024-03-01"),
            chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(log_file_date("label-server.log"), None);
        assert_eq!(log_file_date("other.2024-03-01"), None);
    }

    #[test]
    fn test_cleanup_removes_only_old_rotations() {
        let dir = tempfile::tempdir().unwrap();
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
        fs::write(dir.path().join("label-server.2000-01-01"), b"old").unwrap();
        fs::write(dir.path().join(format!("label-server.{}", today)), b"new").unwrap();
        fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        cleanup_old_logs(dir.path()).unwrap();

        assert!(!dir.path().join("label-server.2000-01-01").exists());
        assert!(dir.path().join(format!("label-server.{}", today)).exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
