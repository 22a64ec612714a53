//! Single label API
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/print | POST | 打印一张标签 |
//! | /api/preview | POST | 预览 (image/png) |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/print", post(handler::print))
        .route("/api/preview", post(handler::preview))
}
