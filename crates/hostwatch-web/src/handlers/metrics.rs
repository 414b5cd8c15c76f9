//! 메트릭 조회 API 핸들러.

use axum::extract::{Query, State};
use axum::Json;
use hostwatch_core::models::snapshot::Snapshot;
use serde::Deserialize;

use crate::error::ApiError;
use crate::AppState;

use super::ApiResponse;

/// 이력 조회 기본 개수
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// 이력 조회 쿼리
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// 최근 개수 (숫자가 아니거나 0이면 기본값)
    pub limit: Option<String>,
}

impl HistoryQuery {
    /// 기본값 적용 후 버퍼 용량으로 제한한 개수
    pub fn resolve(&self, capacity: usize) -> usize {
        self.limit
            .as_deref()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .min(capacity)
    }
}

/// 현재 메트릭 (즉시 수집)
///
/// GET /api/monitoring/metrics/current
pub async fn get_current_metrics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Snapshot>>, ApiError> {
    let snapshot = state.engine.current_metrics().await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}

/// 메트릭 이력
///
/// GET /api/monitoring/metrics/history?limit=
pub async fn get_metrics_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Json<ApiResponse<Vec<Snapshot>>> {
    let limit = params.resolve(state.engine.history_capacity());
    let history = state.engine.history(Some(limit));
    let count = history.len();
    Json(ApiResponse::ok(history).with_count(count))
}
