//! Dispatch errors

use label_printer::PrintError;
use thiserror::Error;

use super::renderer::RenderError;
use crate::utils::AppError;

/// Failure while resolving a printer or sending a label to it
#[derive(Debug, Error)]
pub enum DispatchError {
    /// `virtual:` id with no matching configuration
    #[error("Printer not found: {0}")]
    NotFound(String),

    /// Explicitly requested real device is missing or the scan failed
    #[error("{0}")]
    Device(String),

    /// Device accepted the id but delivery failed
    #[error("Failed to send label to {printer_id}: {source}")]
    Transport {
        printer_id: String,
        #[source]
        source: PrintError,
    },

    /// Virtual printer could not create its directory or write its files
    #[error("Virtual printer {printer_id} failed: {source}")]
    Io {
        printer_id: String,
        #[source]
        source: PrintError,
    },

    #[error("No printers available (no real printers found and no virtual printers configured)")]
    NoPrintersAvailable,

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

impl DispatchError {
    /// Errors caused by collaborators rather than by the request
    pub fn is_unexpected(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Io { .. } => true,
            Self::Render(e) => !e.is_client_error(),
            Self::NotFound(_) | Self::Device(_) | Self::NoPrintersAvailable => false,
        }
    }

    /// Message safe to hand back to a client
    ///
    /// 意外错误只返回通用描述，详细信息写入日志。
    pub fn client_message(&self) -> String {
        match self {
            Self::Transport { .. } => "Failed to send label to printer".to_string(),
            Self::Io { .. } => "Failed to save label".to_string(),
            Self::Render(e) if !e.is_client_error() => "Label rendering failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        if err.is_unexpected() {
            tracing::error!(error = %err, "Print dispatch failed");
        }

        let message = err.client_message();
        match err {
            DispatchError::NotFound(id) => AppError::printer_not_found(id),
            DispatchError::Device(_) => AppError::device(message),
            DispatchError::NoPrintersAvailable => AppError::no_printers(),
            DispatchError::Transport { printer_id, .. } => AppError::device(message)
                .with_detail("printer_id", printer_id),
            DispatchError::Io { printer_id, .. } => {
                AppError::with_message(shared::ErrorCode::OutputWriteFailed, message)
                    .with_detail("printer_id", printer_id)
            }
            DispatchError::Render(e) => e.into(),
        }
    }
}
