//! Websocket endpoint
//!
//! The session token is validated once at upgrade time and the connection
//! is bound to that identity for its lifetime; no identity is renegotiated
//! over the channel. Each connection owns its room subscriptions and drops
//! them on disconnect.

use std::collections::HashSet;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::handlers::bearer_token;
use crate::realtime::events::{ClientEvent, ServerEvent};
use crate::realtime::Subscription;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// GET /ws, upgrade to the realtime channel.
pub async fn realtime_ws(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let token = query
        .token
        .or_else(|| bearer_token(&headers))
        .ok_or(ApiError::Unauthenticated)?;
    let user_id = state
        .sessions
        .validate(&token)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    Ok(ws.on_upgrade(move |socket| handle_connection(socket, state, user_id)))
}

async fn handle_connection(socket: WebSocket, state: AppState, user_id: i64) {
    info!("[Realtime] Connection opened for user {}", user_id);

    let (mut sink, mut stream) = socket.split();

    // Single writer: room forwarders feed this queue, one task owns the sink.
    let (out_tx, mut out_rx) = mpsc::channel::<ServerEvent>(64);
    let mut writer = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            let Ok(frame) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let mut joined: HashSet<String> = HashSet::new();
    let mut forwards: Vec<JoinHandle<()>> = Vec::new();

    loop {
        tokio::select! {
            frame = stream.next() => {
                let Some(Ok(frame)) = frame else { break };
                let text = match frame {
                    Message::Text(text) => text,
                    Message::Close(_) => break,
                    _ => continue,
                };

                let event = match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        debug!("[Realtime] Dropping malformed frame from user {}: {}", user_id, e);
                        continue;
                    }
                };

                if let Subscription::Join(room) = state.dispatcher.handle(user_id, event).await {
                    if joined.insert(room.clone()) {
                        let rx = state.rooms.subscribe(&room).await;
                        forwards.push(spawn_forwarder(rx, out_tx.clone()));
                    }
                }
            }
            // Writer only exits when the peer is gone.
            _ = &mut writer => break,
        }
    }

    for task in &forwards {
        task.abort();
    }
    writer.abort();

    info!("[Realtime] Connection closed for user {}", user_id);
}

/// Forward a room's broadcast stream into the connection's outbound queue.
fn spawn_forwarder(
    mut rx: tokio::sync::broadcast::Receiver<ServerEvent>,
    tx: mpsc::Sender<ServerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("[Realtime] Slow subscriber skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
