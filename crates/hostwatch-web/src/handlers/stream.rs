//! SSE 실시간 스트림 핸들러.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::StreamExt;
use tracing::warn;

use crate::gateway::GatewayEvent;
use crate::AppState;

/// SSE 스트림 엔드포인트
///
/// GET /api/monitoring/stream
///
/// 푸시 전용. SSE event 이름은 게이트웨이 이벤트 이름과 같다.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let observer = state.gateway.attach().await;

    let sse_stream = observer.into_stream().filter_map(|event| to_sse_event(&event).map(Ok));

    Sse::new(sse_stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn to_sse_event(event: &GatewayEvent) -> Option<Event> {
    match event.data_json() {
        Ok(json) => Some(Event::default().event(event.name()).data(json)),
        Err(e) => {
            warn!("SSE 이벤트 직렬화 실패 ({}): {e}", event.name());
            None
        }
    }
}
