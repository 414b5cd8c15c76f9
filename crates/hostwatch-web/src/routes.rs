//! API 라우트 정의.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::AppState;

/// `/api/monitoring` 하위 라우트
pub fn monitoring_routes() -> Router<AppState> {
    Router::new()
        // 메트릭
        .route(
            "/metrics/current",
            get(handlers::metrics::get_current_metrics),
        )
        .route(
            "/metrics/history",
            get(handlers::metrics::get_metrics_history),
        )
        // 시스템 정보
        .route("/system-info", get(handlers::system_info::get_system_info))
        // 경고 임계값
        .route(
            "/alert-thresholds",
            get(handlers::thresholds::get_alert_thresholds)
                .post(handlers::thresholds::update_alert_thresholds),
        )
        // 수집 엔진 제어
        .route("/collector/status", get(handlers::collector::get_status))
        .route("/collector/start", post(handlers::collector::start))
        .route("/collector/stop", post(handlers::collector::stop))
        // 푸시 채널
        .route("/ws", get(handlers::socket::ws_handler))
        .route("/stream", get(handlers::stream::event_stream))
}

/// 전체 라우터 (레이어 제외)
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/monitoring", monitoring_routes())
        .route("/health", get(handlers::health::health))
        .with_state(state)
}
