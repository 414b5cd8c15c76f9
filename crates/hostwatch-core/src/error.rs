//! hostwatch 핵심 에러 타입.
//!
//! 각 어댑터 crate는 자체 에러 타입에서 `#[from] CoreError`로 래핑한다.

use thiserror::Error;

/// 호스트 메트릭 샘플링 실패.
///
/// 스케줄된 사이클에서는 로그만 남기고 다음 틱에서 자연스럽게 재시도된다.
/// 같은 틱 안에서는 재시도하지 않는다.
#[derive(Debug, Error)]
pub enum SamplingError {
    /// 개별 호스트 조회 실패
    #[error("호스트 조회 실패 ({query}): {message}")]
    Query {
        /// 실패한 조회 이름 (예: "cpu", "disk")
        query: &'static str,
        /// 실패 사유
        message: String,
    },

    /// 제한 시간 초과
    #[error("샘플링 타임아웃: {timeout_ms}ms 초과")]
    Timeout {
        /// 초과된 제한 시간 (밀리초)
        timeout_ms: u64,
    },

    /// 블로킹 작업 조인 실패 (패닉 또는 취소)
    #[error("샘플링 작업 조인 실패: {0}")]
    Join(String),

    /// 내부 잠금 오염
    #[error("{0} 잠금 실패")]
    LockPoisoned(&'static str),
}

/// 임계값 범위 위반. 요청 전체가 거부되며 상태는 변경되지 않는다.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("임계값은 0~100 범위여야 함 ({field}: {value})")]
pub struct InvalidThresholdError {
    /// 위반한 필드명
    pub field: &'static str,
    /// 입력값
    pub value: f64,
}

/// 단일 옵저버 전달 실패. 해당 옵저버에만 격리된다.
#[derive(Debug, Clone, Error)]
#[error("옵저버 {observer} 전달 실패: {message}")]
pub struct DeliveryError {
    /// 옵저버 식별자
    pub observer: String,
    /// 실패 사유
    pub message: String,
}

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 샘플링 실패
    #[error(transparent)]
    Sampling(#[from] SamplingError),

    /// 임계값 유효성 검증 실패
    #[error(transparent)]
    InvalidThreshold(#[from] InvalidThresholdError),

    /// 옵저버 전달 실패
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// 수집 주기 오류 (0 이하)
    #[error("수집 주기는 0보다 커야 함: {interval_ms}ms")]
    InvalidInterval {
        /// 요청된 주기 (밀리초)
        interval_ms: u64,
    },

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
