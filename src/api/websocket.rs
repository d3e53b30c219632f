// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing::{debug, info, warn};

use crate::api::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsQuery {
    /// Only forward events of this user when set
    pub user_id: Option<i32>,
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.user_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_filter: Option<i32>) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.bus.subscribe();
    let (reply_tx, mut reply_rx) = mpsc::channel::<String>(8);

    // Send connection confirmation
    let welcome = serde_json::json!({
        "type": "connected",
        "data": { "userId": user_filter }
    });
    if sender
        .send(Message::Text(welcome.to_string().into()))
        .await
        .is_err()
    {
        return;
    }

    info!("WebSocket observer connected (user filter: {:?})", user_filter);

    // Forward bus events and replies to this client
    let mut send_task = tokio::spawn(async move {
        loop {
            let text = tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => {
                        if user_filter.is_some_and(|user_id| user_id != event.user_id()) {
                            continue;
                        }
                        match serde_json::to_string(&event) {
                            Ok(text) => text,
                            Err(e) => {
                                warn!("Failed to encode event: {}", e);
                                continue;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("WebSocket observer lagged, {} events skipped", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
                reply = reply_rx.recv() => match reply {
                    Some(text) => text,
                    None => break,
                },
            };

            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive messages from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Some(reply) = client_reply(text.as_str()) {
                        if reply_tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        debug!("WebSocket observer disconnected");
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

/// The channel is observe-only; the only client message answered is `ping`.
fn client_reply(text: &str) -> Option<String> {
    let msg = serde_json::from_str::<serde_json::Value>(text).ok()?;
    match msg.get("type").and_then(|t| t.as_str()) {
        Some("ping") => Some(serde_json::json!({ "type": "pong" }).to_string()),
        _ => None,
    }
}
