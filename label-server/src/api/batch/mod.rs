//! Batch print API
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/batch-print | POST | 启动批量任务，返回 NDJSON 事件流 |
//! | /api/batch-print/cancel | POST | 取消任务 |
//! | /api/batch-print/{job_id} | GET | 任务状态 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/batch-print", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::start))
        .route("/cancel", post(handler::cancel))
        .route("/{job_id}", get(handler::status))
}
