//! 호스트 시스템 정보 모델.
//!
//! 타이머가 아닌 요청 시점에 조회한다. 캐시는 호출자 책임.

use serde::{Deserialize, Serialize};

/// 시스템 정보 요약
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// 운영체제 정보
    pub os: OsInfo,
    /// CPU 정보
    pub cpu: CpuInfo,
    /// 메모리 정보
    pub memory: MemoryInfo,
}

/// 운영체제 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsInfo {
    /// 플랫폼 (linux, macos, windows ...)
    pub platform: String,
    /// 배포판 이름
    pub distro: String,
    /// 릴리즈 버전
    pub release: String,
    /// 호스트 이름
    pub hostname: String,
    /// 가동 시간 (초)
    pub uptime: u64,
}

/// CPU 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    /// 제조사 (vendor id)
    pub manufacturer: String,
    /// 브랜드 문자열
    pub brand: String,
    /// 논리 코어 수
    pub cores: usize,
    /// 물리 코어 수
    pub physical_cores: usize,
    /// 클럭 속도 (GHz)
    #[serde(rename = "speedGHz")]
    pub speed_ghz: f64,
}

/// 메모리 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryInfo {
    /// 전체 메모리 (바이트)
    pub total_bytes: u64,
    /// 전체 메모리 (GB, 둘째 자리 반올림)
    #[serde(rename = "totalGB")]
    pub total_gb: f64,
}

impl MemoryInfo {
    /// 바이트 단위 전체 용량으로부터 생성
    pub fn from_total(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            total_gb: super::snapshot::round2(total_bytes as f64 / 1024f64.powi(3)),
        }
    }
}
