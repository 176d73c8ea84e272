//! WebSocket delivery of a streamed autonomous battle.
//!
//! The battle is claimed before the upgrade so an unknown id gets a plain
//! HTTP error. After the upgrade the server pushes an `intro` frame, one
//! `turn` frame per resolved turn, a final `result` frame, then closes. A
//! client that goes away cancels the rest of the simulation, and so does a
//! handshake that never completes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use skirmish_domain::{Battle, BattleId, TurnRecord};
use skirmish_shared::StreamMessage;
use uuid::Uuid;

use super::http::ApiError;
use super::views;
use crate::app::App;
use crate::use_cases::battle::{SinkClosed, TurnSink};
use crate::use_cases::BattleError;

pub async fn stream_battle(
    ws: WebSocketUpgrade,
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let battle = app
        .use_cases
        .battles
        .stream
        .start(BattleId::from_uuid(id))
        .await?;
    let battle_id = battle.id();
    tracing::info!(battle_id = %battle_id, "Streaming battle");
    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!(
                battle_id = %battle_id,
                error = %e,
                "Stream handshake failed, battle dropped"
            );
        })
        .on_upgrade(move |socket| handle_socket(socket, app, battle)))
}

async fn handle_socket(socket: WebSocket, app: Arc<App>, battle: Battle) {
    let battle_id = battle.id();
    let (sender, mut receiver) = socket.split();
    let mut sink = WsSink { sender };

    let outcome = tokio::select! {
        result = app.use_cases.battles.stream.run(battle, &mut sink) => Some(result),
        _ = client_gone(&mut receiver) => None,
    };

    match outcome {
        Some(Ok(battle)) => {
            tracing::info!(battle_id = %battle_id, turns = battle.turns().len(), "Stream complete");
            let frame = CloseFrame {
                code: close_code::NORMAL,
                reason: "battle over".into(),
            };
            let _ = sink.sender.send(Message::Close(Some(frame))).await;
        }
        Some(Err(BattleError::StreamClosed(reason))) => {
            tracing::info!(battle_id = %battle_id, reason = %reason, "Stream dropped by client");
        }
        Some(Err(e)) => {
            tracing::warn!(battle_id = %battle_id, error = %e, "Streamed battle failed");
            let frame = CloseFrame {
                code: close_code::ERROR,
                reason: "battle failed".into(),
            };
            let _ = sink.sender.send(Message::Close(Some(frame))).await;
        }
        None => {
            tracing::info!(battle_id = %battle_id, "Client disconnected, battle cancelled");
        }
    }
}

/// Resolves once the client closes the socket or the connection fails.
async fn client_gone(receiver: &mut SplitStream<WebSocket>) {
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) | Err(_) => return,
            Ok(_) => {}
        }
    }
}

struct WsSink {
    sender: SplitSink<WebSocket, Message>,
}

impl WsSink {
    async fn push(&mut self, message: &StreamMessage) -> Result<(), SinkClosed> {
        let json = serde_json::to_string(message).map_err(|e| SinkClosed(e.to_string()))?;
        self.sender
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| SinkClosed(e.to_string()))
    }
}

#[async_trait]
impl TurnSink for WsSink {
    async fn started(&mut self, battle: &Battle) -> Result<(), SinkClosed> {
        self.push(&views::intro_message(battle)).await
    }

    async fn turn(&mut self, battle: &Battle, record: &TurnRecord) -> Result<(), SinkClosed> {
        self.push(&views::turn_message(battle, record)).await
    }

    async fn finished(&mut self, battle: &Battle) -> Result<(), SinkClosed> {
        match views::result_message(battle) {
            Some(message) => self.push(&message).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use futures_util::StreamExt;
    use skirmish_shared::{BattleView, OutcomeData};
    use sqlx::Row;
    use tokio::net::TcpListener;
    use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

    use super::*;
    use crate::api::test_support::{test_app, test_app_with_delay, TestApp};
    use crate::infrastructure::persistence::demo;

    async fn serve(app: &TestApp) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = crate::api::routes().with_state(app.app.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    async fn create_pve(addr: SocketAddr) -> BattleView {
        reqwest::Client::new()
            .post(format!("http://{addr}/api/pve/battles"))
            .json(&serde_json::json!({
                "character_id": demo::KNIGHT,
                "map_id": demo::MEADOW,
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn logged_turns(app: &TestApp, id: Uuid) -> i64 {
        sqlx::query("SELECT COUNT(*) AS n FROM battle_turns WHERE battle_id = ?")
            .bind(id.to_string())
            .fetch_one(&app.pool)
            .await
            .unwrap()
            .get("n")
    }

    async fn finalized_outcome(app: &TestApp, id: Uuid) -> Option<String> {
        sqlx::query("SELECT outcome FROM battles WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&app.pool)
            .await
            .unwrap()
            .get("outcome")
    }

    #[tokio::test]
    async fn streams_every_turn_then_result_then_closes() {
        let app = test_app().await;
        let addr = serve(&app).await;
        let battle = create_pve(addr).await;

        let url = format!("ws://{addr}/api/pve/battles/{}/stream", battle.id);
        let (mut ws, _resp) = connect_async(url).await.unwrap();

        let mut intro = None;
        let mut turns = Vec::new();
        let mut result = None;
        let mut closed = false;
        while let Some(frame) = tokio::time::timeout(Duration::from_secs(10), ws.next())
            .await
            .unwrap()
        {
            match frame.unwrap() {
                WsMessage::Text(text) => match serde_json::from_str::<StreamMessage>(&text).unwrap() {
                    StreamMessage::Intro { message } => {
                        assert!(turns.is_empty(), "intro after a turn");
                        intro = Some(message);
                    }
                    StreamMessage::Turn(turn) => {
                        assert!(intro.is_some(), "turn before intro");
                        assert!(result.is_none(), "turn after result");
                        turns.push(turn.turn);
                    }
                    StreamMessage::Result { outcome, message } => result = Some((outcome, message)),
                    StreamMessage::Unknown => panic!("unexpected frame"),
                },
                WsMessage::Close(_) => {
                    closed = true;
                    break;
                }
                _ => {}
            }
        }

        assert!(intro.unwrap().starts_with("Puddle Slime appeared!"));
        assert_eq!(turns, (1..=9).collect::<Vec<_>>());
        let (outcome, message) = result.unwrap();
        assert_eq!(outcome, OutcomeData::Win);
        assert!(message.starts_with("Victory!"));
        assert!(closed);

        assert_eq!(logged_turns(&app, battle.id).await, 9);
        assert_eq!(finalized_outcome(&app, battle.id).await.as_deref(), Some("WIN"));
    }

    #[tokio::test]
    async fn unknown_battle_is_refused_before_upgrade() {
        let app = test_app().await;
        let addr = serve(&app).await;
        let url = format!("ws://{addr}/api/pve/battles/{}/stream", Uuid::new_v4());
        assert!(connect_async(url).await.is_err());
    }

    #[tokio::test]
    async fn disconnect_cancels_the_simulation() {
        let app = test_app_with_delay(Duration::from_millis(200)).await;
        let addr = serve(&app).await;
        let battle = create_pve(addr).await;

        let url = format!("ws://{addr}/api/pve/battles/{}/stream", battle.id);
        let (mut ws, _resp) = connect_async(url).await.unwrap();
        let first = ws.next().await.unwrap().unwrap();
        assert!(matches!(first, WsMessage::Text(_)));
        drop(ws);

        // Uncancelled, nine turns at 200ms pacing would be done well before this
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(logged_turns(&app, battle.id).await < 9);
        assert_eq!(finalized_outcome(&app, battle.id).await, None);
    }
}
