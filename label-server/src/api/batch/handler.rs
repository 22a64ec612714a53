//! Batch print handlers

use std::convert::Infallible;
use std::future;

use axum::{
    Json,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use shared::models::{BatchEvent, BatchJobStatus, BatchPrintRequest, CancelRequest};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, json_rejection, ok, ok_with_message};

const NDJSON: &str = "application/x-ndjson";

/// POST /api/batch-print - 启动任务并以 NDJSON 流式返回进度事件
///
/// 客户端断开连接时流被丢弃，任务按取消处理。
pub async fn start(
    State(state): State<ServerState>,
    payload: Result<Json<BatchPrintRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload.map_err(json_rejection)?;
    if request.widgets.is_empty() {
        return Err(AppError::validation("No widgets provided"));
    }
    if request.rows.is_empty() {
        return Err(AppError::validation("No rows provided"));
    }

    let job = state.batch_jobs.start(request, state.dispatcher())?;

    let lines = futures::stream::unfold(job.events, |mut events| async move {
        events.recv().await.map(|event| (event, events))
    })
    .filter_map(|event| future::ready(ndjson_line(&event)))
    .map(Ok::<_, Infallible>);

    Ok((
        [
            (header::CONTENT_TYPE, NDJSON),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(lines),
    )
        .into_response())
}

fn ndjson_line(event: &BatchEvent) -> Option<Vec<u8>> {
    match serde_json::to_vec(event) {
        Ok(mut line) => {
            line.push(b'\n');
            Some(line)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode batch event");
            None
        }
    }
}

/// POST /api/batch-print/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    payload: Result<Json<CancelRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let Json(request) = payload.map_err(json_rejection)?;
    state.batch_jobs.cancel(&request.job_id)?;
    Ok(ok_with_message("Cancellation requested."))
}

/// GET /api/batch-print/{job_id}
pub async fn status(
    State(state): State<ServerState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<ApiResponse<BatchJobStatus>>> {
    let status = state.batch_jobs.status(&job_id)?;
    Ok(ok(status))
}
