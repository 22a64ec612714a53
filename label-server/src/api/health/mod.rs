//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 简单健康检查 |
//! | /health/detailed | GET | 详细健康检查 |
//!
//! # 响应示例
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0"
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

/// 健康检查路由
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

/// 简单健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | error)
    status: &'static str,
    /// 版本号
    version: &'static str,
}

/// 详细健康检查响应
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    /// 运行时间 (秒)
    uptime_seconds: u64,
    /// 正在运行的批量任务
    #[serde(skip_serializing_if = "Option::is_none")]
    running_job_id: Option<String>,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health/detailed
pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    Json(DetailedHealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        uptime_seconds: state.uptime_secs(),
        running_job_id: state.batch_jobs.running(),
    })
}
