//! 메트릭 스냅샷 모델.
//!
//! 샘플링 틱 하나에 대응하는 불변 값. 샘플러만 생성하며 생성 시점에
//! 범위 보정과 소수점 둘째 자리 반올림을 적용한다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 소수점 둘째 자리 반올림
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 0~100 범위로 보정한 뒤 둘째 자리 반올림. NaN은 0으로 취급.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    round2(value.clamp(0.0, 100.0))
}

/// 사용량/전체 용량 쌍
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStat {
    /// 사용량 (바이트)
    pub used_bytes: u64,
    /// 전체 용량 (바이트)
    pub total_bytes: u64,
    /// 사용률 (0.0 ~ 100.0, 둘째 자리 반올림)
    pub percent: f64,
}

impl UsageStat {
    /// 사용량/전체로부터 생성. `used > total`이면 `total`로 잘라낸다.
    pub fn new(used_bytes: u64, total_bytes: u64) -> Self {
        let used_bytes = used_bytes.min(total_bytes);
        let percent = if total_bytes > 0 {
            clamp_percent(used_bytes as f64 / total_bytes as f64 * 100.0)
        } else {
            0.0
        };
        Self {
            used_bytes,
            total_bytes,
            percent,
        }
    }
}

/// 주 네트워크 인터페이스 누적 카운터
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkCounters {
    /// 누적 수신 바이트
    pub rx_bytes: u64,
    /// 누적 송신 바이트
    pub tx_bytes: u64,
}

/// 1/5/15분 부하 평균. 미지원 플랫폼에서는 모두 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadAverage(pub [f64; 3]);

/// 샘플러가 호스트에서 읽어온 원시 값
#[derive(Debug, Clone, Default)]
pub struct HostReadings {
    /// CPU 부하 (%)
    pub cpu_load: f64,
    /// 메모리 사용량/전체 (바이트)
    pub memory: (u64, u64),
    /// 디스크 볼륨 사용량/전체 (없으면 None)
    pub disk: Option<(u64, u64)>,
    /// 네트워크 누적 수신/송신 (인터페이스 없으면 None)
    pub network: Option<(u64, u64)>,
    /// 프로세스 수
    pub process_count: u64,
    /// 가동 시간 (초)
    pub uptime_secs: u64,
    /// 부하 평균
    pub load_average: [f64; 3],
}

/// 시스템 메트릭 스냅샷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// 수집 시각 (ISO-8601 직렬화)
    pub timestamp: DateTime<Utc>,
    /// CPU 부하 (0.0 ~ 100.0)
    pub cpu_load_percent: f64,
    /// 메모리 사용 현황
    pub memory: UsageStat,
    /// 디스크 사용 현황 (볼륨 없으면 모두 0)
    pub disk: UsageStat,
    /// 네트워크 누적 카운터 (인터페이스 없으면 0)
    pub network: NetworkCounters,
    /// 프로세스 수
    pub process_count: u64,
    /// 가동 시간 (초)
    pub uptime_seconds: u64,
    /// 부하 평균
    pub load_average: LoadAverage,
}

impl Snapshot {
    /// 원시 값을 정규화하여 스냅샷 생성
    pub fn from_readings(timestamp: DateTime<Utc>, readings: HostReadings) -> Self {
        let (disk_used, disk_total) = readings.disk.unwrap_or((0, 0));
        let (rx_bytes, tx_bytes) = readings.network.unwrap_or((0, 0));
        let [one, five, fifteen] = readings.load_average;

        Self {
            timestamp,
            cpu_load_percent: clamp_percent(readings.cpu_load),
            memory: UsageStat::new(readings.memory.0, readings.memory.1),
            disk: UsageStat::new(disk_used, disk_total),
            network: NetworkCounters { rx_bytes, tx_bytes },
            process_count: readings.process_count,
            uptime_seconds: readings.uptime_secs,
            load_average: LoadAverage([
                sanitize_load(one),
                sanitize_load(five),
                sanitize_load(fifteen),
            ]),
        }
    }
}

fn sanitize_load(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        round2(value)
    } else {
        0.0
    }
}
