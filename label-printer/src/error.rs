//! Error types for the printer library

use std::path::PathBuf;
use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Network connection error
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Printer is offline or unreachable
    #[error("Printer offline: {0}")]
    Offline(String),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Device scan failed or found nothing usable
    #[error("No supported devices found: {0}")]
    NoDevices(String),

    /// Virtual printer output could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bitmap encoding failed
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// JSON record encoding failed
    #[error("Record encoding failed: {0}")]
    Record(#[from] serde_json::Error),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
