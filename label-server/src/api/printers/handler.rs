//! Printer API Handlers

use axum::{Json, extract::State};
use shared::models::PrinterDescriptor;

use crate::core::ServerState;
use crate::utils::{ApiResponse, ok};

/// GET /api/printers - 真实设备在前，虚拟打印机在后
pub async fn list(State(state): State<ServerState>) -> Json<ApiResponse<Vec<PrinterDescriptor>>> {
    ok(state.resolver.list().await)
}
