//! Template Handlers

use axum::{Json, extract::rejection::JsonRejection};
use shared::models::PrintRequest;

use crate::printing::detect_variables;
use crate::utils::{ApiResponse, AppResult, json_rejection, ok};

/// POST /api/template/variables - 模板中出现的占位符名称 (按首次出现顺序)
///
/// 前端据此生成批量打印的数据列。
pub async fn variables(
    payload: Result<Json<PrintRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    let Json(request) = payload.map_err(json_rejection)?;
    Ok(ok(detect_variables(&request.widgets)))
}
