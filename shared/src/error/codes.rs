//! Unified error codes for the label print server
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Printer errors
//! - 2xxx: Batch job errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Printer ====================
    /// Requested printer id does not exist
    PrinterNotFound = 1001,
    /// Real device scan or dispatch failed
    DeviceError = 1002,
    /// Neither a real nor a virtual printer is available
    NoPrintersAvailable = 1003,
    /// None of the widgets produce any output
    NothingToRender = 1004,

    // ==================== 2xxx: Batch ====================
    /// Another batch job is still running
    BatchJobRunning = 2001,
    /// Batch job id unknown
    BatchJobNotFound = 2002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Configuration error
    ConfigError = 9002,
    /// Virtual printer output could not be written
    OutputWriteFailed = 9101,
    /// Label rendering failed
    RenderFailed = 9102,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            // Printer
            ErrorCode::PrinterNotFound => "Printer not found",
            ErrorCode::DeviceError => "Printer device error",
            ErrorCode::NoPrintersAvailable => {
                "No printers available (no real printers found and no virtual printers configured)"
            }
            ErrorCode::NothingToRender => "No renderable widgets provided",

            // Batch
            ErrorCode::BatchJobRunning => "Another batch job is already running",
            ErrorCode::BatchJobNotFound => "Job not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::OutputWriteFailed => "Failed to save label",
            ErrorCode::RenderFailed => "Label rendering failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),

            // Printer
            1001 => Ok(ErrorCode::PrinterNotFound),
            1002 => Ok(ErrorCode::DeviceError),
            1003 => Ok(ErrorCode::NoPrintersAvailable),
            1004 => Ok(ErrorCode::NothingToRender),

            // Batch
            2001 => Ok(ErrorCode::BatchJobRunning),
            2002 => Ok(ErrorCode::BatchJobNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::OutputWriteFailed),
            9102 => Ok(ErrorCode::RenderFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
