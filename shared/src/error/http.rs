//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::PrinterNotFound | Self::BatchJobNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            Self::BatchJobRunning => StatusCode::CONFLICT,

            // 502 Bad Gateway (the device behind us failed)
            Self::DeviceError => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (no destination at all, retry later)
            Self::NoPrintersAvailable => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::ConfigError
            | Self::OutputWriteFailed
            | Self::RenderFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::ValidationFailed | Self::InvalidRequest | Self::NothingToRender => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}
