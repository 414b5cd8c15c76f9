//! 시스템 정보 API 핸들러.

use axum::extract::State;
use axum::Json;
use hostwatch_core::models::system_info::SystemInfo;

use crate::error::ApiError;
use crate::AppState;

use super::ApiResponse;

/// 시스템 정보 (요청 시점 조회, 제한 시간 초과 시 503)
///
/// GET /api/monitoring/system-info
pub async fn get_system_info(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SystemInfo>>, ApiError> {
    let info = state.gateway.system_info().await?;
    Ok(Json(ApiResponse::ok(info)))
}
