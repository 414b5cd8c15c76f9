//! 도메인 모델.
//!
//! 모든 모델은 serde로 직렬화되어 푸시 채널과 조회 API의 페이로드로 그대로 쓰인다.

pub mod alert;
pub mod snapshot;
pub mod system_info;

pub use alert::{AlertEvent, AlertKind, AlertThresholds, ThresholdUpdate};
pub use snapshot::{HostReadings, LoadAverage, NetworkCounters, Snapshot, UsageStat};
pub use system_info::{CpuInfo, MemoryInfo, OsInfo, SystemInfo};
