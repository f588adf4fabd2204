//! WebSocket upgrade handler and per-connection socket loop.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use playnet_entity::user::UserRef;
use playnet_realtime::event::{ClientEvent, ServerEvent};
use playnet_realtime::ConnectionHandle;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt} — WebSocket upgrade.
///
/// Authentication happens before the upgrade; a rejected credential
/// terminates the attempt without touching any real-time state.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let user = state
        .authenticator
        .authenticate(query.token.as_deref())
        .await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, user, socket)))
}

/// Drives one established WebSocket connection.
///
/// A single loop owns both directions: inbound frames are processed one
/// at a time in arrival order, outbound events drain from the handle's
/// queue, and a transport-level ping fires on the configured interval.
async fn handle_socket(state: AppState, user: UserRef, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.realtime.open_connection(user);
    let conn_id = handle.id;
    let user_id = handle.user_id();

    state.realtime.router.handle_connect(handle.clone()).await;

    info!(%conn_id, %user_id, "WebSocket connection established");

    let mut ping = tokio::time::interval(Duration::from_secs(
        state.realtime.ping_interval_seconds(),
    ));
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            error!(%conn_id, error = %e, "failed to serialize outbound event");
                            continue;
                        }
                    };
                    if ws_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(&state, &handle, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {
                    // Binary frames are not part of the protocol; pongs
                    // are consumed by the transport.
                }
                Some(Err(e)) => {
                    warn!(%conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = ping.tick() => {
                if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }

    state.realtime.router.handle_disconnect(&handle).await;

    info!(%conn_id, %user_id, "WebSocket connection closed");
}

/// Decode and dispatch one inbound frame.
///
/// A malformed frame is answered with an `error` event; the connection
/// stays open.
async fn handle_frame(state: &AppState, handle: &Arc<ConnectionHandle>, text: &str) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => state.realtime.router.handle_event(handle, event).await,
        Err(e) => {
            debug!(conn_id = %handle.id, error = %e, "malformed inbound frame");
            handle.send(ServerEvent::Error {
                message: "Malformed event payload".to_string(),
            });
        }
    }
}
