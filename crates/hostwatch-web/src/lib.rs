//! # hostwatch-web
//!
//! 브로드캐스트 게이트웨이와 조회 API 서버.
//! Axum 기반 REST API + WebSocket/SSE 푸시 채널.
//!
//! ## 기능
//! - 현재 메트릭/이력/시스템 정보 조회
//! - 경고 임계값 조회/갱신
//! - 수집 엔진 시작/중지
//! - 실시간 이벤트 푸시 (WebSocket, SSE)

pub mod error;
pub mod gateway;
pub mod handlers;
pub mod routes;

use axum::Router;
use hostwatch_collector::CollectorEngine;
use hostwatch_core::config::{AppConfig, WebConfig};
use hostwatch_core::ports::monitor::SystemInfoProvider;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub use gateway::{BroadcastGateway, GatewayEvent, GatewaySettings, Observer, ObserverCommand};

/// 포트 바인드 최대 시도 횟수
const MAX_PORT_ATTEMPTS: usize = 10;

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 수집 엔진
    pub engine: Arc<CollectorEngine>,
    /// 브로드캐스트 게이트웨이 (시스템 정보 조회 포함)
    pub gateway: Arc<BroadcastGateway>,
    /// 시작 요청에 주기가 없을 때 사용할 기본 주기
    pub default_interval: Duration,
    /// 프로세스 시작 시각 (헬스체크 uptime)
    pub started_at: Instant,
}

impl AppState {
    /// 엔진과 시스템 정보 조회기로 상태 구성
    pub fn new(
        engine: Arc<CollectorEngine>,
        system_info: Arc<dyn SystemInfoProvider>,
        config: &AppConfig,
    ) -> Self {
        let gateway = Arc::new(BroadcastGateway::new(
            engine.clone(),
            system_info,
            GatewaySettings {
                history_on_connect: config.monitor.history_on_connect,
                observer_buffer: config.web.observer_buffer,
                info_timeout: config.capture_timeout(),
            },
        ));

        Self {
            engine,
            gateway,
            default_interval: config.interval(),
            started_at: Instant::now(),
        }
    }
}

/// 모니터링 웹 서버
pub struct WebServer {
    config: WebConfig,
    state: AppState,
}

impl WebServer {
    /// 새 웹 서버 생성
    pub fn new(state: AppState, config: WebConfig) -> Self {
        Self { config, state }
    }

    /// 레이어까지 적용된 라우터
    pub fn app(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        routes::router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// 서버 실행. 종료 신호가 오면 진행 중인 요청을 마치고 반환한다.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), std::io::Error> {
        let host = if self.config.allow_external {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };
        let listener = bind_with_fallback(host, self.config.port).await?;
        info!("모니터링 서버 시작: http://{}", listener.local_addr()?);

        axum::serve(listener, self.app())
            .with_graceful_shutdown(async move {
                // 송신측이 사라져도 종료로 간주
                let _ = shutdown_rx.wait_for(|stop| *stop).await;
                info!("웹 서버 종료 신호 수신");
            })
            .await?;

        info!("모니터링 서버 종료");
        Ok(())
    }

    /// 서버 URL 반환
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.config.port)
    }
}

/// `base_port`부터 최대 10개 포트를 차례로 시도한다.
///
/// 사용 중(`AddrInUse`)인 포트만 건너뛰고, 다른 바인드 에러는 즉시 반환한다.
pub async fn bind_with_fallback(host: IpAddr, base_port: u16) -> std::io::Result<TcpListener> {
    let mut last_error = None;

    for port in (base_port..=u16::MAX).take(MAX_PORT_ATTEMPTS) {
        match TcpListener::bind(SocketAddr::new(host, port)).await {
            Ok(listener) => {
                if port != base_port {
                    warn!("포트 {base_port} 사용 불가, 대체 포트 {port} 사용");
                }
                return Ok(listener);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                debug!("포트 {port} 사용 중");
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            format!("포트 {base_port}부터 바인드 가능한 포트 없음"),
        )
    }))
}
