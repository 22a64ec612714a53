//! 统一错误处理
//!
//! 错误类型统一来自 `shared::error`：
//! - [`AppError`] - 带错误码的应用错误
//! - [`ApiResponse`] - API 响应结构
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::job_not_found(job_id))
//!
//! // 返回成功响应
//! Ok(ok(printers))
//! ```

use axum::Json;
use axum::extract::rejection::JsonRejection;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// 成功响应
pub fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// 成功响应 (仅消息)
pub fn ok_with_message(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse::ok_with_message(message))
}

/// 请求体解析失败 → 400
pub fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::validation(rejection.body_text())
}
