//! 경고 임계값과 경고 이벤트 모델.

use serde::{Deserialize, Serialize};

use crate::error::InvalidThresholdError;

/// 경고 유형. 평가 순서는 cpu → memory → disk로 고정.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// CPU 부하
    Cpu,
    /// 메모리 사용률
    Memory,
    /// 디스크 사용률
    Disk,
}

impl AlertKind {
    /// 사용자 표시용 메시지
    pub fn message(&self) -> &'static str {
        match self {
            AlertKind::Cpu => "CPU 사용률이 임계값을 초과함",
            AlertKind::Memory => "메모리 사용률이 임계값을 초과함",
            AlertKind::Disk => "디스크 사용률이 임계값을 초과함",
        }
    }
}

/// 경고 이벤트 (틱마다 새로 생성, 저장하지 않음)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    /// 경고 유형
    pub kind: AlertKind,
    /// 메시지
    pub message: String,
    /// 관측값 (%)
    pub observed_value: f64,
    /// 적용된 임계값 (%)
    pub threshold: f64,
}

/// 경고 임계값 (%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertThresholds {
    /// CPU 부하 임계값
    #[serde(default = "default_cpu_threshold", alias = "cpu_percent")]
    pub cpu_percent: f64,
    /// 메모리 사용률 임계값
    #[serde(default = "default_memory_threshold", alias = "memory_percent")]
    pub memory_percent: f64,
    /// 디스크 사용률 임계값
    #[serde(default = "default_disk_threshold", alias = "disk_percent")]
    pub disk_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu_percent: default_cpu_threshold(),
            memory_percent: default_memory_threshold(),
            disk_percent: default_disk_threshold(),
        }
    }
}

fn default_cpu_threshold() -> f64 {
    80.0
}
fn default_memory_threshold() -> f64 {
    85.0
}
fn default_disk_threshold() -> f64 {
    90.0
}

/// 부분 임계값 갱신 요청. 지정하지 않은 필드는 기존 값을 유지한다.
///
/// 요청 본문은 `cpuPercent` 형식과 `cpu` 약칭을 모두 받는다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdUpdate {
    /// CPU 임계값
    #[serde(default, alias = "cpu", skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    /// 메모리 임계값
    #[serde(default, alias = "memory", skip_serializing_if = "Option::is_none")]
    pub memory_percent: Option<f64>,
    /// 디스크 임계값
    #[serde(default, alias = "disk", skip_serializing_if = "Option::is_none")]
    pub disk_percent: Option<f64>,
}

impl ThresholdUpdate {
    /// 모든 지정 필드가 [0, 100] 범위인지 검증
    pub fn validate(&self) -> Result<(), InvalidThresholdError> {
        for (field, value) in [
            ("cpu", self.cpu_percent),
            ("memory", self.memory_percent),
            ("disk", self.disk_percent),
        ] {
            if let Some(value) = value {
                check_range(field, value)?;
            }
        }
        Ok(())
    }

    /// 지정된 필드가 하나도 없는지
    pub fn is_empty(&self) -> bool {
        self.cpu_percent.is_none() && self.memory_percent.is_none() && self.disk_percent.is_none()
    }
}

impl AlertThresholds {
    /// 부분 갱신을 병합한 새 임계값 반환.
    ///
    /// 하나라도 범위를 벗어나면 에러를 반환하고 아무 필드도 적용하지 않는다.
    pub fn merged(&self, update: &ThresholdUpdate) -> Result<Self, InvalidThresholdError> {
        update.validate()?;
        Ok(Self {
            cpu_percent: update.cpu_percent.unwrap_or(self.cpu_percent),
            memory_percent: update.memory_percent.unwrap_or(self.memory_percent),
            disk_percent: update.disk_percent.unwrap_or(self.disk_percent),
        })
    }

    /// 전체 필드 범위 검증 (설정 로드 시)
    pub fn validate(&self) -> Result<(), InvalidThresholdError> {
        check_range("cpu", self.cpu_percent)?;
        check_range("memory", self.memory_percent)?;
        check_range("disk", self.disk_percent)
    }
}

fn check_range(field: &'static str, value: f64) -> Result<(), InvalidThresholdError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(InvalidThresholdError { field, value })
    }
}
