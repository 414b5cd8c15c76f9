//! 수집 엔진 이벤트.
//!
//! `tokio::broadcast`로 구독자(게이트웨이 등)에게 전달된다.

use hostwatch_core::models::alert::AlertEvent;
use hostwatch_core::models::snapshot::Snapshot;

/// 엔진이 사이클마다 발행하는 이벤트
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// 새 스냅샷 (매 사이클)
    Metrics(Snapshot),
    /// 임계값 초과 경고 목록 (비어 있으면 발행하지 않음)
    Alerts(Vec<AlertEvent>),
}
