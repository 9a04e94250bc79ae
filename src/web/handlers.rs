//! HTTP request handlers.

use super::AppState;
use crate::monitor::MonitorError;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

fn error_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn monitor_error(e: MonitorError, fallback: &str) -> Response {
    match e {
        MonitorError::UnknownTarget(_) => error_response(StatusCode::NOT_FOUND, "Website not found"),
        MonitorError::Db(e) => {
            tracing::error!("{}: {}", fallback, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, fallback)
        }
    }
}

// ============================================================================
// Service
// ============================================================================

pub async fn handle_root() -> impl IntoResponse {
    Json(json!({ "message": "Siteward status API" }))
}

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.monitor.health();
    if !report.database_connected {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Service unhealthy");
    }

    Json(json!({
        "status": "healthy",
        "timestamp": report.timestamp,
        "database": "connected",
        "monitoring": if report.monitoring_active { "active" } else { "inactive" },
    }))
    .into_response()
}

// ============================================================================
// API: Status
// ============================================================================

pub async fn handle_get_all_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.monitor.get_all_status() {
        Ok(overview) => Json(overview).into_response(),
        Err(e) => monitor_error(e, "Failed to get website status"),
    }
}

pub async fn handle_get_website_status(
    State(state): State<AppState>,
    Path(website): Path<String>,
) -> impl IntoResponse {
    match state.monitor.get_target_status(&website) {
        Ok(status) => Json(status).into_response(),
        Err(e) => monitor_error(e, "Failed to get website status"),
    }
}

pub async fn handle_get_uptime(State(state): State<AppState>) -> impl IntoResponse {
    match state.monitor.get_uptime_history() {
        Ok(uptime) => Json(json!({ "uptime": uptime })).into_response(),
        Err(e) => monitor_error(e, "Failed to get uptime data"),
    }
}

pub async fn handle_force_check(State(state): State<AppState>) -> impl IntoResponse {
    state.monitor.trigger_immediate_check();
    Json(json!({ "message": "Status check initiated" }))
}

pub async fn handle_cleanup(State(state): State<AppState>) -> impl IntoResponse {
    match state.monitor.run_retention_sweep() {
        Ok(report) => Json(json!({
            "message": "Old data cleanup completed",
            "deleted": report,
        }))
        .into_response(),
        Err(e) => monitor_error(e, "Failed to cleanup old data"),
    }
}
