//! 라이프사이클 관리.
//!
//! 종료 시그널을 받으면 수집 엔진을 먼저 멈추고, 구독자(웹 서버)에게 종료를 알린다.

use hostwatch_collector::CollectorEngine;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// 라이프사이클 관리자
pub struct LifecycleManager {
    engine: Arc<CollectorEngine>,
    shutdown_tx: watch::Sender<bool>,
}

impl LifecycleManager {
    /// 엔진 종료를 책임지는 관리자 생성
    pub fn new(engine: Arc<CollectorEngine>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            engine,
            shutdown_tx,
        }
    }

    /// 종료 수신기
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// 수집 중지 후 종료 신호 발송. 두 번째 호출부터는 아무것도 하지 않는다.
    pub fn shutdown(&self) {
        if self.shutdown_tx.send_replace(true) {
            return;
        }
        let was_running = self.engine.stop();
        let status = self.engine.status();
        info!(
            "종료: 수집 {}, 사이클 성공 {} / 실패 {}",
            if was_running { "중지" } else { "이미 중지 상태" },
            status.cycles_completed,
            status.cycles_failed
        );
    }

    /// OS 시그널(SIGINT, SIGTERM, 그 외 플랫폼은 Ctrl+C) 대기 후 종료
    pub async fn wait_for_signal(&self) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigint = signal(SignalKind::interrupt())?;
            let mut sigterm = signal(SignalKind::terminate())?;

            tokio::select! {
                _ = sigint.recv() => info!("SIGINT 수신"),
                _ = sigterm.recv() => info!("SIGTERM 수신"),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await?;
            info!("Ctrl+C 수신");
        }

        self.shutdown();
        Ok(())
    }
}
