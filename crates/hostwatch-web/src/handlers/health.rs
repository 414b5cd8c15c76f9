//! 헬스체크 핸들러.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// 헬스체크 응답
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 항상 "OK"
    pub status: &'static str,
    /// 응답 시각 (RFC3339)
    pub timestamp: String,
    /// 프로세스 가동 시간 (초)
    pub uptime: f64,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}
