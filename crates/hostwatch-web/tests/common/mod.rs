//! 웹 통합 테스트 공용 스텁.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use hostwatch_collector::{CollectorEngine, EngineSettings};
use hostwatch_core::config::AppConfig;
use hostwatch_core::error::SamplingError;
use hostwatch_core::models::snapshot::{HostReadings, Snapshot};
use hostwatch_core::models::system_info::{CpuInfo, MemoryInfo, OsInfo, SystemInfo};
use hostwatch_core::ports::monitor::{MetricsSampler, SystemInfoProvider};
use hostwatch_web::AppState;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// 호출 순번을 프로세스 수와 타임스탬프(초)에 담는 샘플러
#[derive(Default)]
pub struct SequenceSampler {
    calls: AtomicU64,
    pub fail: AtomicBool,
    pub cpu: AtomicF64,
}

/// f64를 원자적으로 보관
#[derive(Default)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::SeqCst);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::SeqCst))
    }
}

impl SequenceSampler {
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsSampler for SequenceSampler {
    async fn capture(&self) -> Result<Snapshot, SamplingError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SamplingError::Query {
                query: "memory",
                message: "테스트 실패".to_string(),
            });
        }
        let seq = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Snapshot::from_readings(
            Utc.timestamp_opt(1_700_000_000 + seq as i64, 0).unwrap(),
            HostReadings {
                cpu_load: self.cpu.get(),
                memory: (40, 100),
                disk: Some((50, 100)),
                network: Some((1000, 2000)),
                process_count: seq,
                uptime_secs: 100 + seq,
                load_average: [0.5, 0.4, 0.3],
            },
        ))
    }
}

/// 고정 시스템 정보
pub struct StaticInfo {
    pub fail: bool,
}

pub fn system_info() -> SystemInfo {
    SystemInfo {
        os: OsInfo {
            platform: "linux".to_string(),
            distro: "Test Linux".to_string(),
            release: "1.0".to_string(),
            hostname: "test-host".to_string(),
            uptime: 1234,
        },
        cpu: CpuInfo {
            manufacturer: "GenuineIntel".to_string(),
            brand: "Test CPU".to_string(),
            cores: 8,
            physical_cores: 4,
            speed_ghz: 3.2,
        },
        memory: MemoryInfo::from_total(16 * 1024 * 1024 * 1024),
    }
}

#[async_trait]
impl SystemInfoProvider for StaticInfo {
    async fn system_info(&self) -> Result<SystemInfo, SamplingError> {
        if self.fail {
            return Err(SamplingError::Query {
                query: "system-info",
                message: "테스트 실패".to_string(),
            });
        }
        Ok(system_info())
    }
}

/// 응답하지 않는 시스템 정보 조회기
pub struct StalledInfo;

#[async_trait]
impl SystemInfoProvider for StalledInfo {
    async fn system_info(&self) -> Result<SystemInfo, SamplingError> {
        std::future::pending().await
    }
}

/// 테스트용 앱 상태
pub struct Harness {
    pub sampler: Arc<SequenceSampler>,
    pub engine: Arc<CollectorEngine>,
    pub state: AppState,
}

pub fn harness() -> Harness {
    harness_with(AppConfig::default(), false)
}

pub fn harness_with(config: AppConfig, info_fails: bool) -> Harness {
    harness_with_info(config, |_| Arc::new(StaticInfo { fail: info_fails }))
}

/// 엔진을 받아 시스템 정보 조회기를 만드는 하네스
pub fn harness_with_info(
    config: AppConfig,
    make_info: impl FnOnce(Arc<CollectorEngine>) -> Arc<dyn SystemInfoProvider>,
) -> Harness {
    let sampler = Arc::new(SequenceSampler::default());
    sampler.cpu.set(10.0);
    let engine = Arc::new(CollectorEngine::new(
        sampler.clone(),
        EngineSettings::from_config(&config),
    ));
    let info = make_info(engine.clone());
    let state = AppState::new(engine.clone(), info, &config);
    Harness {
        sampler,
        engine,
        state,
    }
}
