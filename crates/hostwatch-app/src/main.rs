//! # hostwatch-app
//!
//! hostwatch 서버 바이너리 진입점.
//! 설정 로드, DI 와이어링, 수집 엔진 기동, 라이프사이클 관리.

mod cli;
mod lifecycle;

use anyhow::{Context, Result};
use clap::Parser;
use hostwatch_collector::{CollectorEngine, EngineSettings};
use hostwatch_core::config::AppConfig;
use hostwatch_monitor::SysInfoSampler;
use hostwatch_web::{AppState, WebServer};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::lifecycle::LifecycleManager;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .init();

    info!("hostwatch 시작 (v{})", env!("CARGO_PKG_VERSION"));

    // 설정: 파일 → 환경변수 → CLI
    let (config_path, required) = args.config_source();
    let mut config = AppConfig::load(config_path.as_deref(), required)
        .context("설정 로드 실패")?;
    args.apply_overrides(&mut config);
    config.validate().context("설정 검증 실패")?;

    info!(
        "수집 주기 {}ms, 이력 {}개, 임계값 cpu {}% / memory {}% / disk {}%",
        config.monitor.interval_ms,
        config.monitor.history_capacity,
        config.alerts.cpu_percent,
        config.alerts.memory_percent,
        config.alerts.disk_percent
    );

    // ── 어댑터 ──
    let sampler = Arc::new(SysInfoSampler::new());

    // ── 수집 엔진 ──
    let engine = Arc::new(CollectorEngine::new(
        sampler.clone(),
        EngineSettings::from_config(&config),
    ));

    let lifecycle = LifecycleManager::new(engine.clone());

    if config.monitor.autostart {
        engine.start(config.interval())?;
    } else {
        info!("자동 시작 비활성화: /api/monitoring/collector/start 요청 대기");
    }

    // ── 웹 서버 ──
    let web_task = if config.web.enabled {
        let state = AppState::new(engine.clone(), sampler.clone(), &config);
        let server = WebServer::new(state, config.web.clone());
        info!("대시보드 주소: {}", server.url());
        let shutdown_rx = lifecycle.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = server.run(shutdown_rx).await {
                error!("웹 서버 에러: {e}");
            }
        }))
    } else {
        info!("웹 서버 비활성화");
        None
    };

    lifecycle
        .wait_for_signal()
        .await
        .context("시그널 핸들러 등록 실패")?;

    if let Some(task) = web_task {
        let _ = task.await;
    }

    info!("hostwatch 종료");
    Ok(())
}
