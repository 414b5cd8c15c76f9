//! WebSocket 푸시 채널 핸들러.
//!
//! 양방향. 서버 → 클라이언트는 게이트웨이 이벤트, 클라이언트 → 서버는 제어 메시지.
//! 모든 프레임은 `{"event": name, "data": payload}` JSON 텍스트.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tracing::debug;

use crate::gateway::GatewayEvent;
use crate::AppState;

/// WebSocket 업그레이드 엔드포인트
///
/// GET /api/monitoring/ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut observer = state.gateway.attach().await;
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = observer.recv() => {
                let Some(event) = event else { break };
                if let Err(e) = send_event(&mut sink, &event).await {
                    observer.delivery_failed(e);
                    break;
                }
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        // 응답은 요청한 옵저버에게만
                        let reply = state.gateway.handle_frame(text.as_str()).await;
                        if let Err(e) = send_event(&mut sink, &reply).await {
                            observer.delivery_failed(e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Ping/Pong/Binary
                    Some(Err(e)) => {
                        debug!("옵저버 {} 수신 에러: {e}", observer.id());
                        break;
                    }
                }
            }
        }
    }

    let _ = sink.close().await;
}

async fn send_event(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &GatewayEvent,
) -> Result<(), String> {
    let frame = event.to_frame().map_err(|e| format!("직렬화 실패: {e}"))?;
    sink.send(Message::Text(frame.into()))
        .await
        .map_err(|e| format!("전송 실패: {e}"))
}
