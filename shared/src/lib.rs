//! Shared types for the label print server
//!
//! Wire models (widgets, settings, printers, batch events) and the
//! unified error / response types used by the HTTP layer.

pub mod error;
pub mod models;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
