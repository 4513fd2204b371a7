use crate::router::MessageRouter;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

use crate::app::AppState;

/// Upgrade handler for `/ws/vision`.
pub async fn vision_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, state.router))
}

/// Receive loop for one connection.
///
/// Messages are handled one at a time, so replies leave in request order.
/// Only a disconnect or a transport error ends the loop.
pub async fn run_session(mut socket: WebSocket, router: MessageRouter) {
    let session_id = Uuid::new_v4();
    let span = tracing::info_span!("session", id = %session_id);

    async move {
        tracing::info!("session open");

        while let Some(msg) = socket.recv().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Binary(data)) => {
                    tracing::debug!(bytes = data.len(), "binary frame ignored");
                    continue;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "peer closed connection");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "transport error");
                    break;
                }
            };

            let Some(reply) = router.handle(&text).await else {
                continue;
            };
            let json = match reply.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize reply");
                    continue;
                }
            };
            if let Err(e) = socket.send(Message::Text(json)).await {
                tracing::debug!(error = %e, "send failed; closing session");
                break;
            }
        }

        tracing::info!("session closed");
    }
    .instrument(span)
    .await
}
