use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, DrawError};
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub role: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!("WebSocket connection request: role={:?}", params.role);

    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

async fn handle_socket(socket: WebSocket, params: WsQuery, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let role = match params.role.as_deref() {
        Some("operator") => Role::Operator,
        Some("beamer") => Role::Beamer,
        _ => Role::Audience,
    };

    tracing::info!("WebSocket connected with role: {:?}", role);

    let welcome = ServerMessage::Welcome {
        protocol: "1.0".to_string(),
        role: role.clone(),
        snapshot: state.snapshot().await,
        server_now: chrono::Utc::now().to_rfc3339(),
    };

    if let Ok(msg) = serde_json::to_string(&welcome) {
        if sender.send(Message::Text(msg.into())).await.is_err() {
            tracing::error!("Failed to send welcome message");
            return;
        }
    }

    // The operator drives the session request/response style; beamer and
    // audience sockets are passive subscribers of the broadcast channel.
    if role == Role::Operator {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    tracing::debug!("Received message: {}", text);

                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => {
                            if let Some(response) = handle_message(client_msg, &role, &state).await
                            {
                                if let Ok(json) = serde_json::to_string(&response) {
                                    if sender.send(Message::Text(json.into())).await.is_err() {
                                        tracing::error!("Failed to send response");
                                        break;
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            tracing::error!("Failed to parse client message: {}", e);
                            let error = ServerMessage::Error {
                                code: "PARSE_ERROR".to_string(),
                                msg: format!("Invalid message format: {}", e),
                            };
                            if let Ok(json) = serde_json::to_string(&error) {
                                let _ = sender.send(Message::Text(json.into())).await;
                            }
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("WebSocket closed");
                    break;
                }
                Ok(Message::Ping(data)) => {
                    if sender.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            }
        }
    } else {
        let mut updates = state.beamer_broadcast.subscribe();

        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Ok(msg) => {
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Display client lagged behind by {} messages", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                incoming = receiver.next() => match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                },
            }
        }
    }

    tracing::info!("WebSocket connection closed for role: {:?}", role);
}

fn draw_error_code(err: &DrawError) -> &'static str {
    match err {
        DrawError::AlreadyAwarded => "ALREADY_AWARDED",
        DrawError::InsufficientParticipants { .. } => "INSUFFICIENT_PARTICIPANTS",
        DrawError::DrawInProgress => "DRAW_IN_PROGRESS",
        DrawError::PrizeNotFound => "PRIZE_NOT_FOUND",
    }
}

pub async fn handle_message(
    msg: ClientMessage,
    role: &Role,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::GetSnapshot => Some(ServerMessage::Snapshot {
            snapshot: state.snapshot().await,
        }),

        ClientMessage::AddList { name, raw_lines } => {
            if *role != Role::Operator {
                return Some(ServerMessage::Error {
                    code: "UNAUTHORIZED".to_string(),
                    msg: "Only the operator can upload lists".to_string(),
                });
            }

            tracing::info!("Operator uploading list '{}'", name);
            match state.add_list(name, raw_lines).await {
                Ok(list) => {
                    state.broadcast_snapshot().await;
                    Some(ServerMessage::ListAdded { list })
                }
                Err(e) => Some(ServerMessage::Error {
                    code: "ADD_LIST_FAILED".to_string(),
                    msg: e,
                }),
            }
        }

        ClientMessage::RemoveList { list_id } => {
            if *role != Role::Operator {
                return Some(ServerMessage::Error {
                    code: "UNAUTHORIZED".to_string(),
                    msg: "Only the operator can remove lists".to_string(),
                });
            }

            tracing::info!("Operator removing list: {}", list_id);
            match state.remove_list(&list_id).await {
                Ok(()) => {
                    state.broadcast_snapshot().await;
                    Some(ServerMessage::ListRemoved { list_id })
                }
                Err(e) => Some(ServerMessage::Error {
                    code: "REMOVE_LIST_FAILED".to_string(),
                    msg: e,
                }),
            }
        }

        ClientMessage::AddPrize {
            name,
            quantity,
            scope,
        } => {
            if *role != Role::Operator {
                return Some(ServerMessage::Error {
                    code: "UNAUTHORIZED".to_string(),
                    msg: "Only the operator can add prizes".to_string(),
                });
            }

            tracing::info!("Operator adding prize '{}' x{}", name, quantity);
            match state.add_prize(name, quantity, scope).await {
                Ok(prize) => {
                    state.broadcast_snapshot().await;
                    Some(ServerMessage::PrizeAdded { prize })
                }
                Err(e) => Some(ServerMessage::Error {
                    code: "ADD_PRIZE_FAILED".to_string(),
                    msg: e,
                }),
            }
        }

        ClientMessage::RemovePrize { prize_id } => {
            if *role != Role::Operator {
                return Some(ServerMessage::Error {
                    code: "UNAUTHORIZED".to_string(),
                    msg: "Only the operator can remove prizes".to_string(),
                });
            }

            tracing::info!("Operator removing prize: {}", prize_id);
            match state.remove_prize(&prize_id).await {
                Ok(()) => {
                    state.broadcast_snapshot().await;
                    Some(ServerMessage::PrizeRemoved { prize_id })
                }
                Err(e) => Some(ServerMessage::Error {
                    code: "REMOVE_PRIZE_FAILED".to_string(),
                    msg: e,
                }),
            }
        }

        ClientMessage::Draw { prize_id } => {
            if *role != Role::Operator {
                return Some(ServerMessage::Error {
                    code: "UNAUTHORIZED".to_string(),
                    msg: "Only the operator can run draws".to_string(),
                });
            }

            tracing::info!("Operator drawing prize: {}", prize_id);
            match state.draw(&prize_id).await {
                Ok(outcome) => {
                    // Displays get the suspense first; the already-committed
                    // batch follows after the configured delay.
                    state.broadcast_to_beamers(ServerMessage::DrawStarted {
                        prize: outcome.prize.clone(),
                    });
                    crate::broadcast::schedule_reveal(
                        state.clone(),
                        outcome.prize.clone(),
                        outcome.winners.clone(),
                    );

                    Some(ServerMessage::DrawResult {
                        prize: outcome.prize,
                        winners: outcome.winners,
                    })
                }
                Err(e) => Some(ServerMessage::Error {
                    code: draw_error_code(&e).to_string(),
                    msg: e.to_string(),
                }),
            }
        }
    }
}
