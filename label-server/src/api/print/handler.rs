//! Single label handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::IntoResponse,
};
use shared::models::{PrintOutcome, PrintRequest};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, json_rejection};

fn validated(payload: Result<Json<PrintRequest>, JsonRejection>) -> AppResult<PrintRequest> {
    let Json(request) = payload.map_err(json_rejection)?;
    if request.widgets.is_empty() {
        return Err(AppError::validation("No widgets provided"));
    }
    request.settings.validate().map_err(AppError::validation)?;
    Ok(request)
}

/// POST /api/print
pub async fn print(
    State(state): State<ServerState>,
    payload: Result<Json<PrintRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<PrintOutcome>>> {
    let request = validated(payload)?;

    let outcome = state
        .resolver
        .resolve(
            request.settings.printer_selection(),
            &request.widgets,
            &request.settings,
        )
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        "Label sent to printer.",
        outcome,
    )))
}

/// POST /api/preview
pub async fn preview(
    State(state): State<ServerState>,
    payload: Result<Json<PrintRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let request = validated(payload)?;
    let png = state.resolver.preview(&request.widgets, &request.settings)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
