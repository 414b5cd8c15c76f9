//! 브로드캐스트 게이트웨이.
//!
//! 수집 엔진 이벤트 하나를 N개의 옵저버로 팬아웃하고, 옵저버의 제어 메시지를
//! 엔진으로 중계한다. 전송 계층(WebSocket, SSE)과 무관하다.
//!
//! 새 옵저버는 접속 즉시 `system-info`(실패 시 생략)와 최근 이력을 받은 뒤
//! 실시간 이벤트를 받기 시작한다. 엔진 구독을 이력 조회보다 먼저 하므로 그 사이
//! 발생한 사이클도 놓치지 않으며, 이미 이력으로 보낸 스냅샷은 다시 보내지 않는다.
//!
//! 옵저버 버퍼가 가득 차면 그 옵저버만 연결을 끊는다.

use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use hostwatch_collector::{CollectorEngine, EngineEvent};
use hostwatch_core::error::{DeliveryError, SamplingError};
use hostwatch_core::models::alert::{AlertEvent, AlertThresholds, ThresholdUpdate};
use hostwatch_core::models::snapshot::Snapshot;
use hostwatch_core::models::system_info::SystemInfo;
use hostwatch_core::ports::monitor::SystemInfoProvider;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 접속 직후 system-info + metrics-history 두 건이 들어갈 최소 버퍼
const INITIAL_BURST: usize = 2;

/// 옵저버에게 전달되는 이벤트.
///
/// 직렬화 형식: `{"event": "system-metrics", "data": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum GatewayEvent {
    /// 새 스냅샷
    SystemMetrics(Snapshot),
    /// 경고 목록
    SystemAlerts(Vec<AlertEvent>),
    /// 시스템 정보 (접속 시 1회)
    SystemInfo(SystemInfo),
    /// 스냅샷 이력 (시간순)
    MetricsHistory(Vec<Snapshot>),
    /// 임계값 갱신 결과
    AlertThresholds(AlertThresholds),
    /// 요청 처리 실패
    Error {
        /// 에러 메시지
        message: String,
    },
}

impl GatewayEvent {
    /// 에러 이벤트 생성
    pub fn error(message: impl Into<String>) -> Self {
        GatewayEvent::Error {
            message: message.into(),
        }
    }

    /// 이벤트 이름 (SSE event 필드)
    pub fn name(&self) -> &'static str {
        match self {
            GatewayEvent::SystemMetrics(_) => "system-metrics",
            GatewayEvent::SystemAlerts(_) => "system-alerts",
            GatewayEvent::SystemInfo(_) => "system-info",
            GatewayEvent::MetricsHistory(_) => "metrics-history",
            GatewayEvent::AlertThresholds(_) => "alert-thresholds",
            GatewayEvent::Error { .. } => "error",
        }
    }

    /// `{"event", "data"}` 프레임 JSON
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// 페이로드만 JSON으로
    pub fn data_json(&self) -> Result<String, serde_json::Error> {
        match self {
            GatewayEvent::SystemMetrics(snapshot) => serde_json::to_string(snapshot),
            GatewayEvent::SystemAlerts(alerts) => serde_json::to_string(alerts),
            GatewayEvent::SystemInfo(info) => serde_json::to_string(info),
            GatewayEvent::MetricsHistory(history) => serde_json::to_string(history),
            GatewayEvent::AlertThresholds(thresholds) => serde_json::to_string(thresholds),
            GatewayEvent::Error { message } => {
                serde_json::to_string(&serde_json::json!({ "message": message }))
            }
        }
    }
}

/// 옵저버 → 엔진 제어 메시지
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverCommand {
    /// 즉시 수집 후 요청자에게 응답
    GetCurrentMetrics,
    /// 이력 조회 (limit 없으면 전체)
    GetMetricsHistory {
        /// 최근 개수
        limit: Option<usize>,
    },
    /// 임계값 부분 갱신
    UpdateThresholds(ThresholdUpdate),
}

/// 제어 메시지 해석 실패
#[derive(Debug, Error)]
pub enum CommandError {
    /// JSON 형식 오류
    #[error("잘못된 메시지 형식: {0}")]
    Malformed(String),

    /// 알 수 없는 이벤트
    #[error("알 수 없는 이벤트: {0}")]
    Unknown(String),

    /// 페이로드 오류
    #[error("{event} 페이로드 오류: {message}")]
    InvalidPayload {
        /// 이벤트 이름
        event: String,
        /// 사유
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct CommandFrame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryRequest {
    #[serde(default)]
    limit: Option<usize>,
}

impl ObserverCommand {
    /// `{"event": ..., "data": ...}` 프레임 해석
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let frame: CommandFrame =
            serde_json::from_str(text).map_err(|e| CommandError::Malformed(e.to_string()))?;

        let invalid = |e: serde_json::Error| CommandError::InvalidPayload {
            event: frame.event.clone(),
            message: e.to_string(),
        };

        match frame.event.as_str() {
            "get-current-metrics" => Ok(ObserverCommand::GetCurrentMetrics),
            "get-metrics-history" => {
                let request: HistoryRequest = if frame.data.is_null() {
                    HistoryRequest::default()
                } else {
                    serde_json::from_value(frame.data.clone()).map_err(invalid)?
                };
                Ok(ObserverCommand::GetMetricsHistory {
                    limit: request.limit,
                })
            }
            "update-thresholds" => {
                let update: ThresholdUpdate =
                    serde_json::from_value(frame.data.clone()).map_err(invalid)?;
                Ok(ObserverCommand::UpdateThresholds(update))
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// 게이트웨이 설정
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// 접속 시 전송할 이력 개수
    pub history_on_connect: usize,
    /// 옵저버별 송신 버퍼
    pub observer_buffer: usize,
    /// 시스템 정보 조회 제한 시간
    pub info_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            history_on_connect: 10,
            observer_buffer: 64,
            info_timeout: Duration::from_secs(10),
        }
    }
}

/// 브로드캐스트 게이트웨이
pub struct BroadcastGateway {
    engine: Arc<CollectorEngine>,
    system_info: Arc<dyn SystemInfoProvider>,
    settings: GatewaySettings,
    observers: Arc<AtomicUsize>,
}

impl BroadcastGateway {
    /// 새 게이트웨이 생성
    pub fn new(
        engine: Arc<CollectorEngine>,
        system_info: Arc<dyn SystemInfoProvider>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            engine,
            system_info,
            settings,
            observers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 현재 연결된 옵저버 수
    pub fn observer_count(&self) -> usize {
        self.observers.load(Ordering::Relaxed)
    }

    /// 시스템 정보 조회. 제한 시간을 넘기면 `SamplingError::Timeout`.
    pub async fn system_info(&self) -> Result<SystemInfo, SamplingError> {
        let timeout = self.settings.info_timeout;
        match tokio::time::timeout(timeout, self.system_info.system_info()).await {
            Ok(result) => result,
            Err(_) => Err(SamplingError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// 새 옵저버 연결.
    ///
    /// 반환 시점에 system-info와 이력이 이미 옵저버 버퍼에 들어 있다.
    pub async fn attach(&self) -> Observer {
        let id = uuid::Uuid::new_v4().to_string();
        let engine_rx = self.engine.subscribe();
        let (tx, rx) = mpsc::channel(self.settings.observer_buffer.max(INITIAL_BURST));

        match self.system_info().await {
            Ok(info) => {
                let _ = tx.try_send(GatewayEvent::SystemInfo(info));
            }
            Err(e) => debug!("옵저버 {id}: 시스템 정보 조회 실패 (생략): {e}"),
        }

        let history = self.engine.history(Some(self.settings.history_on_connect));
        let cutoff = history.last().map(|s| s.timestamp);
        let _ = tx.try_send(GatewayEvent::MetricsHistory(history));

        let forwarder = tokio::spawn(forward_events(id.clone(), engine_rx, tx, cutoff));

        let count = self.observers.fetch_add(1, Ordering::Relaxed) + 1;
        info!("옵저버 연결: {id} (현재 {count}명)");

        Observer {
            id,
            events: rx,
            forwarder,
            observers: self.observers.clone(),
        }
    }

    /// 제어 메시지 처리. 반환값은 요청자에게만 전달한다.
    pub async fn handle_command(&self, command: ObserverCommand) -> GatewayEvent {
        match command {
            ObserverCommand::GetCurrentMetrics => match self.engine.current_metrics().await {
                Ok(snapshot) => GatewayEvent::SystemMetrics(snapshot),
                Err(e) => {
                    warn!("요청 수집 실패: {e}");
                    GatewayEvent::error(e.to_string())
                }
            },
            ObserverCommand::GetMetricsHistory { limit } => {
                GatewayEvent::MetricsHistory(self.engine.history(limit))
            }
            ObserverCommand::UpdateThresholds(update) => {
                match self.engine.update_thresholds(&update) {
                    Ok(thresholds) => GatewayEvent::AlertThresholds(thresholds),
                    Err(e) => GatewayEvent::error(e.to_string()),
                }
            }
        }
    }

    /// 원시 텍스트 프레임 처리. 해석 실패도 `error` 이벤트로 응답한다.
    pub async fn handle_frame(&self, text: &str) -> GatewayEvent {
        match ObserverCommand::parse(text) {
            Ok(command) => self.handle_command(command).await,
            Err(e) => {
                debug!("제어 메시지 거부: {e}");
                GatewayEvent::error(e.to_string())
            }
        }
    }
}

/// 엔진 이벤트를 한 옵저버의 버퍼로 전달.
///
/// 버퍼가 가득 찬 옵저버는 전달을 멈추고 연결을 끊는다 (송신측 drop).
/// 다른 옵저버와 엔진은 기다리지 않는다.
async fn forward_events(
    id: String,
    mut engine_rx: broadcast::Receiver<EngineEvent>,
    tx: mpsc::Sender<GatewayEvent>,
    mut cutoff: Option<DateTime<Utc>>,
) {
    let mut skip_alerts = false;

    loop {
        let event = match engine_rx.recv().await {
            Ok(EngineEvent::Metrics(snapshot)) => {
                if cutoff.is_some_and(|ts| snapshot.timestamp <= ts) {
                    // 이력으로 이미 보낸 스냅샷
                    skip_alerts = true;
                    continue;
                }
                cutoff = None;
                skip_alerts = false;
                GatewayEvent::SystemMetrics(snapshot)
            }
            Ok(EngineEvent::Alerts(alerts)) => {
                if skip_alerts {
                    skip_alerts = false;
                    continue;
                }
                GatewayEvent::SystemAlerts(alerts)
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("옵저버 {id}: 이벤트 {skipped}건 유실 (처리 지연)");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                let err = DeliveryError {
                    observer: id.clone(),
                    message: format!("송신 버퍼 초과, {} 이벤트 전달 불가", event.name()),
                };
                warn!("{err}");
                break;
            }
            Err(TrySendError::Closed(_)) => break,
        }
    }

    debug!("옵저버 {id}: 전달 루프 종료");
}

/// 연결된 옵저버. drop 시 연결 해제.
pub struct Observer {
    id: String,
    events: mpsc::Receiver<GatewayEvent>,
    forwarder: JoinHandle<()>,
    observers: Arc<AtomicUsize>,
}

impl Observer {
    /// 옵저버 식별자
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 다음 이벤트 수신
    pub async fn recv(&mut self) -> Option<GatewayEvent> {
        self.events.recv().await
    }

    /// 전송 실패 기록. 다른 옵저버와 엔진에는 영향이 없다.
    pub fn delivery_failed(&self, message: impl Into<String>) -> DeliveryError {
        let err = DeliveryError {
            observer: self.id.clone(),
            message: message.into(),
        };
        warn!("{err}");
        err
    }

    /// 이벤트 스트림으로 변환 (SSE용)
    pub fn into_stream(self) -> impl Stream<Item = GatewayEvent> {
        stream::unfold(self, |mut observer| async move {
            observer.recv().await.map(|event| (event, observer))
        })
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.forwarder.abort();
        let remaining = self.observers.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        info!("옵저버 연결 해제: {} (현재 {remaining}명)", self.id);
    }
}
