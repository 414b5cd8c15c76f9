//! # hostwatch-collector
//!
//! 수집 엔진과 그 구성 요소.
//!
//! - [`history`]: 고정 용량 스냅샷 이력 버퍼
//! - [`alerts`]: 임계값 경고 평가 (순수 함수)
//! - [`engine`]: 주기 스케줄, 사이클 실행, 이벤트 발행
//! - [`event`]: 엔진 이벤트

pub mod alerts;
pub mod engine;
pub mod event;
pub mod history;

pub use engine::{CollectorEngine, EngineSettings, EngineStatus};
pub use event::EngineEvent;
pub use history::HistoryBuffer;
