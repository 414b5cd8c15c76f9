//! 수집 엔진 제어 API 핸들러.
//!
//! 엔진의 외부 소유자(대시보드 등)가 시작/중지를 요청할 때 사용한다.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use hostwatch_collector::EngineStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ApiError;
use crate::AppState;

use super::ApiResponse;

/// 엔진 상태 + 연결된 옵저버 수
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorStatusResponse {
    /// 엔진 상태
    #[serde(flatten)]
    pub engine: EngineStatus,
    /// 연결된 옵저버 수
    pub observers: usize,
}

/// 시작 요청 본문 (생략 가능)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    /// 수집 주기 (밀리초, 기본: 설정값)
    pub interval_ms: Option<u64>,
}

/// 시작/중지 결과
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResponse {
    /// 상태가 실제로 바뀌었는지
    pub changed: bool,
    /// 요청 처리 후 상태
    pub status: CollectorStatusResponse,
}

fn status_of(state: &AppState) -> CollectorStatusResponse {
    CollectorStatusResponse {
        engine: state.engine.status(),
        observers: state.gateway.observer_count(),
    }
}

/// GET /api/monitoring/collector/status
pub async fn get_status(State(state): State<AppState>) -> Json<ApiResponse<CollectorStatusResponse>> {
    Json(ApiResponse::ok(status_of(&state)))
}

/// POST /api/monitoring/collector/start
pub async fn start(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse<ControlResponse>>, ApiError> {
    let request: StartRequest = if body.is_empty() {
        StartRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?
    };

    let interval = request
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or(state.default_interval);
    let changed = state.engine.start(interval)?;
    let message = if changed {
        "수집 시작됨"
    } else {
        "이미 실행 중"
    };

    Ok(Json(
        ApiResponse::ok(ControlResponse {
            changed,
            status: status_of(&state),
        })
        .with_message(message),
    ))
}

/// POST /api/monitoring/collector/stop
pub async fn stop(State(state): State<AppState>) -> Json<ApiResponse<ControlResponse>> {
    let changed = state.engine.stop();
    let message = if changed {
        "수집 중지됨"
    } else {
        "이미 중지 상태"
    };

    Json(
        ApiResponse::ok(ControlResponse {
            changed,
            status: status_of(&state),
        })
        .with_message(message),
    )
}
