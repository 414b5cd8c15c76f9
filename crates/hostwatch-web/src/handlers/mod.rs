//! API 핸들러 모듈.

pub mod collector;
pub mod health;
pub mod metrics;
pub mod socket;
pub mod stream;
pub mod system_info;
pub mod thresholds;

use chrono::Utc;
use serde::Serialize;

/// 공통 응답 봉투
///
/// `{ success, data, count?, message?, timestamp }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// 성공 여부
    pub success: bool,
    /// 응답 데이터
    pub data: T,
    /// 목록 길이 (목록 응답만)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// 안내 메시지
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 응답 시각 (RFC3339)
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// 성공 응답
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
            message: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// 목록 길이 추가
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// 메시지 추가
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
