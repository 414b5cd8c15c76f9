//! 수집 엔진 스케줄 통합 테스트.
//!
//! 가상 시간(start_paused)으로 틱 수를 검증한다.

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use hostwatch_collector::{CollectorEngine, EngineEvent, EngineSettings};
use hostwatch_core::error::SamplingError;
use hostwatch_core::models::alert::AlertKind;
use hostwatch_core::models::snapshot::{HostReadings, Snapshot};
use hostwatch_core::ports::monitor::MetricsSampler;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 호출 순번으로 스냅샷을 만드는 테스트 샘플러
struct ScriptedSampler {
    calls: AtomicU64,
    fail_on: HashSet<u64>,
    cpu: f64,
    delay: Option<Duration>,
}

impl ScriptedSampler {
    fn new() -> Self {
        Self {
            calls: AtomicU64::new(0),
            fail_on: HashSet::new(),
            cpu: 10.0,
            delay: None,
        }
    }

    fn failing_on(calls: &[u64]) -> Self {
        Self {
            fail_on: calls.iter().copied().collect(),
            ..Self::new()
        }
    }

    fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricsSampler for ScriptedSampler {
    async fn capture(&self) -> Result<Snapshot, SamplingError> {
        let seq = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on.contains(&seq) {
            return Err(SamplingError::Query {
                query: "cpu",
                message: format!("호출 {seq} 실패"),
            });
        }
        Ok(Snapshot::from_readings(
            Utc.timestamp_opt(1_700_000_000 + seq as i64, 0).unwrap(),
            HostReadings {
                cpu_load: self.cpu,
                memory: (20, 100),
                disk: Some((30, 100)),
                process_count: seq,
                ..Default::default()
            },
        ))
    }
}

fn engine_with(sampler: Arc<ScriptedSampler>) -> CollectorEngine {
    CollectorEngine::new(sampler, EngineSettings::default())
}

const TICK: Duration = Duration::from_secs(1);

#[tokio::test(start_paused = true)]
async fn first_cycle_runs_immediately() {
    let sampler = Arc::new(ScriptedSampler::new());
    let engine = engine_with(sampler.clone());

    assert!(engine.start(TICK).unwrap());
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(sampler.calls(), 1);
    assert_eq!(engine.history(None).len(), 1);
    assert!(engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn double_start_keeps_single_schedule() {
    let sampler = Arc::new(ScriptedSampler::new());
    let engine = engine_with(sampler.clone());

    assert!(engine.start(TICK).unwrap());
    assert!(!engine.start(TICK).unwrap());
    assert!(!engine.start(Duration::from_millis(100)).unwrap());

    // t = 0, 1, 2, 3초 → 4틱
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(sampler.calls(), 4);
    assert_eq!(engine.status().interval_ms, Some(1000));
}

#[tokio::test(start_paused = true)]
async fn failed_capture_does_not_stop_schedule() {
    let sampler = Arc::new(ScriptedSampler::failing_on(&[1]));
    let engine = engine_with(sampler.clone());

    engine.start(TICK).unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(sampler.calls(), 2);
    let history = engine.history(None);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].process_count, 2);

    let status = engine.status();
    assert!(status.running);
    assert_eq!(status.cycles_failed, 1);
    assert_eq!(status.cycles_completed, 1);
}

#[tokio::test(start_paused = true)]
async fn stop_halts_further_ticks() {
    let sampler = Arc::new(ScriptedSampler::new());
    let engine = engine_with(sampler.clone());

    engine.start(TICK).unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(sampler.calls(), 2);

    assert!(engine.stop());
    assert!(!engine.stop());
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(sampler.calls(), 2);
    assert!(!engine.status().running);
    // 이력은 중지 후에도 조회 가능
    assert_eq!(engine.history(None).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn restart_after_stop() {
    let sampler = Arc::new(ScriptedSampler::new());
    let engine = engine_with(sampler.clone());

    engine.start(TICK).unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    engine.stop();

    assert!(engine.start(TICK).unwrap());
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(sampler.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn slow_cycles_skip_missed_ticks() {
    let sampler = Arc::new(ScriptedSampler {
        delay: Some(Duration::from_millis(2500)),
        ..ScriptedSampler::new()
    });
    let engine = CollectorEngine::new(
        sampler.clone(),
        EngineSettings {
            capture_timeout: Duration::from_secs(60),
            ..EngineSettings::default()
        },
    );

    engine.start(TICK).unwrap();
    tokio::time::sleep(Duration::from_millis(5200)).await;

    // 사이클은 겹치지 않는다: 0~2.5초, 2.5~5초, 5초~
    assert_eq!(sampler.calls(), 3);
    assert_eq!(engine.history(None).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn capture_timeout_surfaces_as_sampling_error() {
    let sampler = Arc::new(ScriptedSampler {
        delay: Some(Duration::from_secs(3600)),
        ..ScriptedSampler::new()
    });
    let engine = CollectorEngine::new(
        sampler,
        EngineSettings {
            capture_timeout: Duration::from_millis(100),
            ..EngineSettings::default()
        },
    );

    let result = engine.current_metrics().await;
    assert_matches!(result, Err(SamplingError::Timeout { timeout_ms: 100 }));
    assert!(engine.history(None).is_empty());
}

#[tokio::test]
async fn current_metrics_failure_propagates() {
    let sampler = Arc::new(ScriptedSampler::failing_on(&[1]));
    let engine = engine_with(sampler);

    assert_matches!(
        engine.current_metrics().await,
        Err(SamplingError::Query { query: "cpu", .. })
    );
    assert!(engine.history(None).is_empty());
    // 스케줄 실패로 집계하지 않는다
    assert_eq!(engine.status().cycles_failed, 0);

    // 다음 호출은 성공
    let snapshot = engine.current_metrics().await.unwrap();
    assert_eq!(snapshot.process_count, 2);
    assert_eq!(engine.status().cycles_completed, 1);
}

#[tokio::test(start_paused = true)]
async fn alerts_follow_metrics_every_tick() {
    let sampler = Arc::new(ScriptedSampler {
        cpu: 95.0,
        ..ScriptedSampler::new()
    });
    let engine = engine_with(sampler);
    let mut rx = engine.subscribe();

    engine.start(TICK).unwrap();

    for _ in 0..2 {
        assert_matches!(rx.recv().await.unwrap(), EngineEvent::Metrics(_));
        match rx.recv().await.unwrap() {
            EngineEvent::Alerts(alerts) => {
                assert_eq!(alerts.len(), 1);
                assert_eq!(alerts[0].kind, AlertKind::Cpu);
                assert_eq!(alerts[0].observed_value, 95.0);
                assert_eq!(alerts[0].threshold, 80.0);
            }
            other => panic!("경고 이벤트 예상: {other:?}"),
        }
    }
    engine.stop();
}

#[tokio::test(start_paused = true)]
async fn threshold_update_applies_to_next_cycle() {
    let sampler = Arc::new(ScriptedSampler::new());
    let engine = engine_with(sampler);
    let mut rx = engine.subscribe();

    engine
        .update_thresholds(&hostwatch_core::models::ThresholdUpdate {
            cpu_percent: Some(5.0),
            ..Default::default()
        })
        .unwrap();
    engine.current_metrics().await.unwrap();

    assert_matches!(rx.recv().await.unwrap(), EngineEvent::Metrics(_));
    assert_matches!(rx.recv().await.unwrap(), EngineEvent::Alerts(alerts) if alerts[0].threshold == 5.0);
}

#[tokio::test(start_paused = true)]
async fn history_order_matches_capture_order() {
    let sampler = Arc::new(ScriptedSampler::new());
    let engine = CollectorEngine::new(
        sampler,
        EngineSettings {
            history_capacity: 3,
            ..EngineSettings::default()
        },
    );

    engine.start(TICK).unwrap();
    tokio::time::sleep(Duration::from_millis(4500)).await;
    engine.stop();

    let seqs: Vec<u64> = engine.history(None).iter().map(|s| s.process_count).collect();
    assert_eq!(seqs, vec![3, 4, 5]);
    assert_eq!(
        engine
            .history(Some(2))
            .iter()
            .map(|s| s.process_count)
            .collect::<Vec<_>>(),
        vec![4, 5]
    );
}
