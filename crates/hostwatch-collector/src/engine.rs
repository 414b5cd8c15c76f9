//! 수집 엔진.
//!
//! 상태: `Stopped`(초기) → `start()` → `Running` → `stop()` → `Stopped`.
//! 양방향 모두 멱등. 사이클 = 샘플링 → 이력 추가 → 경고 평가 → 이벤트 발행.
//!
//! 스케줄 사이클은 단일 태스크에서 순차 실행되므로 느린 사이클 동안 밀린 틱은
//! 건너뛴다. 요청 시점 사이클(`current_metrics`)과는 사이클 잠금으로 직렬화되어
//! 이력 순서가 샘플링 시작 순서와 같다.

use hostwatch_core::config::AppConfig;
use hostwatch_core::error::{CoreError, InvalidThresholdError, SamplingError};
use hostwatch_core::models::alert::{AlertThresholds, ThresholdUpdate};
use hostwatch_core::models::snapshot::Snapshot;
use hostwatch_core::ports::monitor::MetricsSampler;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::alerts::evaluate;
use crate::event::EngineEvent;
use crate::history::HistoryBuffer;

/// 엔진 생성 설정
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// 이력 버퍼 용량
    pub history_capacity: usize,
    /// 샘플링 제한 시간
    pub capture_timeout: Duration,
    /// 이벤트 브로드캐스트 채널 용량
    pub event_capacity: usize,
    /// 초기 임계값
    pub thresholds: AlertThresholds,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            history_capacity: 100,
            capture_timeout: Duration::from_secs(10),
            event_capacity: 256,
            thresholds: AlertThresholds::default(),
        }
    }
}

impl EngineSettings {
    /// 애플리케이션 설정에서 생성
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            history_capacity: config.monitor.history_capacity,
            capture_timeout: config.capture_timeout(),
            event_capacity: config.web.event_channel_capacity,
            thresholds: config.alerts,
        }
    }
}

/// 엔진 상태 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    /// 스케줄 실행 중 여부
    pub running: bool,
    /// 현재 수집 주기 (실행 중일 때만)
    pub interval_ms: Option<u64>,
    /// 이력 길이
    pub history_len: usize,
    /// 이력 용량
    pub history_capacity: usize,
    /// 성공한 사이클 수
    pub cycles_completed: u64,
    /// 실패한 스케줄 사이클 수 (요청 시점 수집 실패는 호출자 몫)
    pub cycles_failed: u64,
    /// 현재 임계값
    pub thresholds: AlertThresholds,
}

/// 사이클 실행에 필요한 공유 상태
struct EngineCore {
    sampler: Arc<dyn MetricsSampler>,
    history: RwLock<HistoryBuffer>,
    thresholds: RwLock<AlertThresholds>,
    events: broadcast::Sender<EngineEvent>,
    cycle_lock: tokio::sync::Mutex<()>,
    capture_timeout: Duration,
    cycles_completed: AtomicU64,
    cycles_failed: AtomicU64,
}

impl EngineCore {
    /// 사이클 1회 실행
    async fn run_cycle(&self) -> Result<Snapshot, SamplingError> {
        let _guard = self.cycle_lock.lock().await;

        let snapshot = self.capture().await?;

        self.history.write().append(snapshot.clone());

        let thresholds = *self.thresholds.read();
        let alerts = evaluate(&snapshot, &thresholds);

        // 구독자가 없으면 send는 실패한다. 엔진은 옵저버 수와 무관하게 동작.
        let _ = self.events.send(EngineEvent::Metrics(snapshot.clone()));
        if !alerts.is_empty() {
            info!("경고 {}건 발생", alerts.len());
            let _ = self.events.send(EngineEvent::Alerts(alerts));
        }

        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        Ok(snapshot)
    }

    async fn capture(&self) -> Result<Snapshot, SamplingError> {
        match tokio::time::timeout(self.capture_timeout, self.sampler.capture()).await {
            Ok(result) => result,
            Err(_) => Err(SamplingError::Timeout {
                timeout_ms: self.capture_timeout.as_millis() as u64,
            }),
        }
    }
}

/// 실행 중인 스케줄 핸들
struct Schedule {
    interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// 수집 엔진
///
/// 프로세스 진입점에서 한 번 생성하여 `Arc`로 공유한다.
pub struct CollectorEngine {
    core: Arc<EngineCore>,
    schedule: Mutex<Option<Schedule>>,
}

impl CollectorEngine {
    /// 새 엔진 생성 (Stopped 상태)
    pub fn new(sampler: Arc<dyn MetricsSampler>, settings: EngineSettings) -> Self {
        let (events, _) = broadcast::channel(settings.event_capacity.max(1));
        Self {
            core: Arc::new(EngineCore {
                sampler,
                history: RwLock::new(HistoryBuffer::new(settings.history_capacity)),
                thresholds: RwLock::new(settings.thresholds),
                events,
                cycle_lock: tokio::sync::Mutex::new(()),
                capture_timeout: settings.capture_timeout,
                cycles_completed: AtomicU64::new(0),
                cycles_failed: AtomicU64::new(0),
            }),
            schedule: Mutex::new(None),
        }
    }

    /// 주기 수집 시작.
    ///
    /// 첫 사이클은 즉시 백그라운드에서 실행되며 이 호출은 그 완료를 기다리지 않는다.
    /// 이미 실행 중이면 아무것도 하지 않고 `Ok(false)`.
    pub fn start(&self, interval: Duration) -> Result<bool, CoreError> {
        if interval.is_zero() {
            return Err(CoreError::InvalidInterval {
                interval_ms: interval.as_millis() as u64,
            });
        }

        let mut schedule = self.schedule.lock();
        if let Some(current) = schedule.as_ref() {
            if !current.handle.is_finished() {
                info!(
                    "수집 엔진 이미 실행 중 (주기 {}ms): 시작 요청 무시",
                    current.interval.as_millis()
                );
                return Ok(false);
            }
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_schedule(self.core.clone(), interval, shutdown_rx));
        *schedule = Some(Schedule {
            interval,
            shutdown_tx,
            handle,
        });

        info!("수집 엔진 시작: 주기 {}ms", interval.as_millis());
        Ok(true)
    }

    /// 주기 수집 중지.
    ///
    /// 반환 이후 새 사이클은 시작되지 않는다. 진행 중인 사이클은 끝까지 실행된다.
    /// 이미 중지 상태면 `false`.
    pub fn stop(&self) -> bool {
        match self.schedule.lock().take() {
            Some(schedule) => {
                let _ = schedule.shutdown_tx.send(true);
                info!("수집 엔진 중지");
                true
            }
            None => {
                debug!("수집 엔진 이미 중지 상태");
                false
            }
        }
    }

    /// 스케줄 실행 중 여부
    pub fn is_running(&self) -> bool {
        self.schedule
            .lock()
            .as_ref()
            .is_some_and(|s| !s.handle.is_finished())
    }

    /// 스케줄과 별개로 즉시 사이클 1회 실행 후 스냅샷 반환.
    ///
    /// 실패는 호출자에게 그대로 전달된다.
    pub async fn current_metrics(&self) -> Result<Snapshot, SamplingError> {
        self.core.run_cycle().await
    }

    /// 이력 조회. `None`이면 전체, `Some(k)`면 최근 k개 (시간순).
    pub fn history(&self, count: Option<usize>) -> Vec<Snapshot> {
        let history = self.core.history.read();
        match count {
            Some(count) => history.latest(count),
            None => history.all(),
        }
    }

    /// 가장 최근 스냅샷
    pub fn last_snapshot(&self) -> Option<Snapshot> {
        self.core.history.read().last().cloned()
    }

    /// 이력 버퍼 용량
    pub fn history_capacity(&self) -> usize {
        self.core.history.read().capacity()
    }

    /// 임계값 부분 갱신. 하나라도 범위를 벗어나면 아무것도 바꾸지 않는다.
    pub fn update_thresholds(
        &self,
        update: &ThresholdUpdate,
    ) -> Result<AlertThresholds, InvalidThresholdError> {
        let mut thresholds = self.core.thresholds.write();
        let merged = thresholds.merged(update)?;
        *thresholds = merged;
        info!(
            "경고 임계값 갱신: cpu {}%, memory {}%, disk {}%",
            merged.cpu_percent, merged.memory_percent, merged.disk_percent
        );
        Ok(merged)
    }

    /// 현재 임계값
    pub fn thresholds(&self) -> AlertThresholds {
        *self.core.thresholds.read()
    }

    /// 이벤트 구독
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.core.events.subscribe()
    }

    /// 상태 요약
    pub fn status(&self) -> EngineStatus {
        let interval_ms = self
            .schedule
            .lock()
            .as_ref()
            .filter(|s| !s.handle.is_finished())
            .map(|s| s.interval.as_millis() as u64);
        let (history_len, history_capacity) = {
            let history = self.core.history.read();
            (history.len(), history.capacity())
        };

        EngineStatus {
            running: interval_ms.is_some(),
            interval_ms,
            history_len,
            history_capacity,
            cycles_completed: self.core.cycles_completed.load(Ordering::Relaxed),
            cycles_failed: self.core.cycles_failed.load(Ordering::Relaxed),
            thresholds: self.thresholds(),
        }
    }
}

/// 스케줄 루프. 첫 틱은 즉시 발생한다.
async fn run_schedule(
    core: Arc<EngineCore>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                debug!("수집 루프 종료");
                break;
            }
            _ = ticker.tick() => {
                if *shutdown_rx.borrow() {
                    break;
                }
                if let Err(e) = core.run_cycle().await {
                    core.cycles_failed.fetch_add(1, Ordering::Relaxed);
                    warn!("수집 사이클 실패 (다음 틱에서 재시도): {e}");
                }
            }
        }
    }
}
