//! API 에러 처리.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hostwatch_core::error::{CoreError, InvalidThresholdError, SamplingError};
use serde::Serialize;
use thiserror::Error;

/// API 에러
#[derive(Debug, Error)]
pub enum ApiError {
    /// 샘플링 실패 (일시적)
    #[error("메트릭 수집 실패: {0}")]
    Sampling(#[from] SamplingError),

    /// 임계값 범위 위반
    #[error(transparent)]
    InvalidThreshold(#[from] InvalidThresholdError),

    /// 잘못된 요청
    #[error("잘못된 요청: {0}")]
    BadRequest(String),

    /// 내부 서버 오류
    #[error("내부 서버 오류: {0}")]
    Internal(String),
}

/// 에러 응답 본문
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// 항상 false
    pub success: bool,
    /// 에러 메시지
    pub error: String,
    /// HTTP 상태 코드
    pub status: u16,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Sampling(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidThreshold(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Sampling(e) => ApiError::Sampling(e),
            CoreError::InvalidThreshold(e) => ApiError::InvalidThreshold(e),
            CoreError::InvalidInterval { .. } => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
