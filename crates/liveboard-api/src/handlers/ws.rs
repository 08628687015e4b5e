//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use liveboard_auth::VerifiedIdentity;
use liveboard_realtime::event::serializer::encode_server_event;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the handshake.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
///
/// The token is checked before anything else, so a bad token is a 401
/// whether or not the request is a valid upgrade.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let identity = state.authenticator.authenticate(query.token.as_deref())?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    // Frames between max_frame_bytes and this cap are rejected by the
    // engine with a validation error; the socket stays open.
    let max_socket = state.config.realtime.max_socket_bytes;
    Ok(ws
        .max_message_size(max_socket)
        .on_upgrade(move |socket| handle_socket(state, identity, socket)))
}

/// Pumps one socket until either side closes or the engine shuts down.
async fn handle_socket(state: AppState, identity: VerifiedIdentity, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let engine = state.engine;

    let (handle, mut outbound) = engine.connections.open(identity).await;
    let conn_id = handle.id;
    // The pool owns the handle; closing it there ends the writer.
    drop(handle);

    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let frame = match encode_server_event(&event) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(conn_id = %conn_id, event = event.name(), error = %e, "Failed to encode event");
                    continue;
                }
            };
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.send(Message::Close(None)).await;
    });

    let mut shutdown = engine.shutdown_receiver();
    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    engine.connections.handle_inbound(conn_id, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                    break;
                }
            },
            _ = shutdown.recv() => break,
        }
    }

    engine.connections.close(conn_id).await;
    let _ = writer.await;
}
