//! 경고 임계값 API 핸들러.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use hostwatch_core::models::alert::{AlertThresholds, ThresholdUpdate};

use crate::error::ApiError;
use crate::AppState;

use super::ApiResponse;

/// 현재 임계값
///
/// GET /api/monitoring/alert-thresholds
pub async fn get_alert_thresholds(
    State(state): State<AppState>,
) -> Json<ApiResponse<AlertThresholds>> {
    Json(ApiResponse::ok(state.engine.thresholds()))
}

/// 임계값 부분 갱신. 범위 위반 시 400, 아무 필드도 바뀌지 않는다.
///
/// POST /api/monitoring/alert-thresholds
pub async fn update_alert_thresholds(
    State(state): State<AppState>,
    body: Result<Json<ThresholdUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<AlertThresholds>>, ApiError> {
    let Json(update) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let thresholds = state.engine.update_thresholds(&update)?;
    Ok(Json(
        ApiResponse::ok(thresholds).with_message("경고 임계값이 갱신됨"),
    ))
}
