//! 호스트 모니터링 포트.
//!
//! 구현: `hostwatch-monitor` crate (sysinfo)

use async_trait::async_trait;

use crate::error::SamplingError;
use crate::models::snapshot::Snapshot;
use crate::models::system_info::SystemInfo;

/// 호스트 메트릭 샘플러
///
/// 하위 조회(부하, 메모리, 디스크, 네트워크, 프로세스 수)가 모두 성공해야
/// 스냅샷을 반환한다. 부분 스냅샷은 없다.
#[async_trait]
pub trait MetricsSampler: Send + Sync {
    /// 스냅샷 1개 수집
    async fn capture(&self) -> Result<Snapshot, SamplingError>;
}

/// 시스템 정보 조회
#[async_trait]
pub trait SystemInfoProvider: Send + Sync {
    /// 현재 시스템 정보 조회
    async fn system_info(&self) -> Result<SystemInfo, SamplingError>;
}
