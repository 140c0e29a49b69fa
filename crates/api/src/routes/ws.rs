//! Live update WebSocket endpoint.
//!
//! Observers connect here and receive the payload-free `assets:updated`
//! event whenever booking state changes; they refetch authoritative state
//! themselves. There is no per-observer back-pressure: a lagging observer
//! just gets one coalesced event.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::Response,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::app::AppState;
use crate::broadcast::{Broadcaster, STATE_CHANGED_EVENT};

/// GET /api/v1/ws
pub async fn live_updates(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let broadcaster = state.broadcaster.clone();
    ws.on_upgrade(move |socket| observe(socket, broadcaster))
}

async fn observe(mut socket: WebSocket, broadcaster: Broadcaster) {
    let mut events = broadcaster.subscribe();
    debug!("Observer connected");

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    // Lagged means signals were coalesced, which is fine:
                    // one event still tells the observer to refetch.
                    Ok(()) | Err(RecvError::Lagged(_)) => {
                        if socket
                            .send(Message::Text(STATE_CHANGED_EVENT.to_string()))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Inbound content is ignored; this is a one-way feed.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!("Observer disconnected");
}
