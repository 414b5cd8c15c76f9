//! 애플리케이션 설정 구조체.
//!
//! 수집 주기, 이력 버퍼 크기, 초기 경고 임계값, 웹 서버 설정을 정의한다.
//! `config` crate를 통해 파일/환경변수에서 로드.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::CoreError;
use crate::models::alert::AlertThresholds;

/// 환경변수 접두사 (`HOSTWATCH_MONITOR__INTERVAL_MS=5000`)
pub const ENV_PREFIX: &str = "HOSTWATCH";

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 수집 엔진 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// 초기 경고 임계값
    #[serde(default)]
    pub alerts: AlertThresholds,
    /// 웹 서버 설정
    #[serde(default)]
    pub web: WebConfig,
}

// ============================================================
// 수집 엔진 설정
// ============================================================

/// 수집 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// 수집 주기 (밀리초)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// 이력 버퍼 최대 길이
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// 샘플링 제한 시간 (밀리초)
    #[serde(default = "default_capture_timeout_ms")]
    pub capture_timeout_ms: u64,
    /// 새 옵저버 접속 시 전송할 이력 개수
    #[serde(default = "default_history_on_connect")]
    pub history_on_connect: usize,
    /// 프로세스 시작 시 수집 자동 시작
    #[serde(default = "default_true")]
    pub autostart: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            history_capacity: default_history_capacity(),
            capture_timeout_ms: default_capture_timeout_ms(),
            history_on_connect: default_history_on_connect(),
            autostart: true,
        }
    }
}

// ============================================================
// 웹 서버 설정
// ============================================================

/// 웹 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// 웹 서버 활성화 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 웹 서버 포트 (기본: 5000)
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// 외부 접근 허용 여부 (false: 127.0.0.1 only)
    #[serde(default)]
    pub allow_external: bool,
    /// 엔진 이벤트 브로드캐스트 채널 용량
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
    /// 옵저버별 송신 버퍼 크기
    #[serde(default = "default_observer_buffer")]
    pub observer_buffer: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_web_port(),
            allow_external: false,
            event_channel_capacity: default_event_channel_capacity(),
            observer_buffer: default_observer_buffer(),
        }
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 설정 로드: 파일(선택) → 환경변수 순으로 덮어쓴다.
    ///
    /// `required`가 false면 파일이 없어도 기본값으로 진행한다.
    pub fn load(path: Option<&Path>, required: bool) -> Result<Self, CoreError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            debug!("설정 파일: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(required));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.monitor.interval_ms == 0 {
            return Err(CoreError::InvalidInterval { interval_ms: 0 });
        }
        if self.monitor.history_capacity == 0 {
            return Err(CoreError::Config(
                "history_capacity는 1 이상이어야 함".to_string(),
            ));
        }
        if self.monitor.capture_timeout_ms == 0 {
            return Err(CoreError::Config(
                "capture_timeout_ms는 0보다 커야 함".to_string(),
            ));
        }
        if self.web.event_channel_capacity == 0 || self.web.observer_buffer == 0 {
            return Err(CoreError::Config(
                "채널 용량은 1 이상이어야 함".to_string(),
            ));
        }
        self.alerts.validate()?;
        Ok(())
    }

    /// 수집 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.monitor.interval_ms)
    }

    /// 샘플링 제한 시간을 Duration으로 반환
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.monitor.capture_timeout_ms)
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_true() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    30_000
}
fn default_history_capacity() -> usize {
    100
}
fn default_capture_timeout_ms() -> u64 {
    10_000
}
fn default_history_on_connect() -> usize {
    10
}
fn default_web_port() -> u16 {
    5000
}
fn default_event_channel_capacity() -> usize {
    256
}
fn default_observer_buffer() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.monitor.interval_ms, 30_000);
        assert_eq!(config.monitor.history_capacity, 100);
        assert_eq!(config.monitor.history_on_connect, 10);
        assert_eq!(config.web.port, 5000);
        assert!(!config.web.allow_external);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let config = AppConfig::load(None, false).unwrap();
        assert_eq!(config.monitor.history_capacity, 100);
        assert_eq!(config.alerts, AlertThresholds::default());
    }

    #[test]
    fn load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[monitor]\ninterval_ms = 2000\nhistory_capacity = 20\n\n[alerts]\ncpu_percent = 70.0\n\n[web]\nport = 8123"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path()), true).unwrap();
        assert_eq!(config.monitor.interval_ms, 2000);
        assert_eq!(config.monitor.history_capacity, 20);
        assert_eq!(config.alerts.cpu_percent, 70.0);
        assert_eq!(config.alerts.memory_percent, 85.0);
        assert_eq!(config.web.port, 8123);
    }

    #[test]
    fn load_rejects_out_of_range_threshold() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[alerts]\ndisk_percent = 120.0").unwrap();

        let result = AppConfig::load(Some(file.path()), true);
        assert_matches!(result, Err(CoreError::InvalidThreshold(_)));
    }

    #[test]
    fn zero_interval_is_invalid() {
        let mut config = AppConfig::default();
        config.monitor.interval_ms = 0;
        assert_matches!(
            config.validate(),
            Err(CoreError::InvalidInterval { interval_ms: 0 })
        );
    }

    #[test]
    fn duration_conversions() {
        let config = AppConfig::default();
        assert_eq!(config.interval().as_millis(), 30_000);
        assert_eq!(config.capture_timeout().as_millis(), 10_000);
    }
}
