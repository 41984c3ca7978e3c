//! Operator WebSocket sessions.
//!
//! Each session subscribes to the hub and forwards `newMessage` events.
//! The session also remembers the reply target (address + language) of
//! the most recent message it forwarded — a single slot, overwritten on
//! every new message. A second inbound arriving before the operator
//! replies silently replaces the reply target; that is the documented
//! single-operator limitation, not hidden global state.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ConsoleEvent;
use crate::relay::{OutboundReply, RelayPipeline};

/// Events the console client sends over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum ClientEvent {
    /// Informational hello from the console; logged only.
    Join { data: String },
    /// Reply to the session's current message using the remembered target.
    Reply { text: String },
}

/// Where the session's next reply goes.
#[derive(Debug, Clone)]
struct ReplyTarget {
    number: String,
    lang: String,
}

pub async fn handle_socket(mut socket: WebSocket, pipeline: Arc<RelayPipeline>) {
    let session = Uuid::new_v4();
    info!(session = %session, "Console session connected");

    let mut rx = pipeline.hub().subscribe();
    let mut reply_target: Option<ReplyTarget> = None;

    loop {
        tokio::select! {
            // Forward hub events to this session
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if let ConsoleEvent::NewMessage { payload } = &event {
                            if let Some(target) = extract_reply_target(payload) {
                                reply_target = Some(target);
                            }
                        }
                        if !send_event(&mut socket, &event).await {
                            debug!(session = %session, "Session disconnected during send");
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!(session = %session, missed = n, "Session lagged behind hub");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("Hub closed");
                        break;
                    }
                }
            }

            // Receive events from the console client
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_event(
                            &text,
                            &mut socket,
                            session,
                            &pipeline,
                            &reply_target,
                        )
                        .await;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(session = %session, "Console session disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(session = %session, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!(session = %session, "Console session closed");
}

async fn handle_client_event(
    text: &str,
    socket: &mut WebSocket,
    session: Uuid,
    pipeline: &RelayPipeline,
    reply_target: &Option<ReplyTarget>,
) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(ClientEvent::Join { data }) => {
            info!(session = %session, "{data}");
        }
        Ok(ClientEvent::Reply { text }) => {
            let Some(target) = reply_target else {
                send_event(
                    socket,
                    &ConsoleEvent::ReplyFailed {
                        error: "no inbound message to reply to".to_string(),
                    },
                )
                .await;
                return;
            };

            let reply = OutboundReply {
                text,
                number: target.number.clone(),
                lang: target.lang.clone(),
            };
            let event = match pipeline.handle_outbound(reply).await {
                Ok(receipt) => ConsoleEvent::ReplyStatus { receipt },
                Err(e) => {
                    warn!(session = %session, error = %e, "Session reply failed");
                    ConsoleEvent::ReplyFailed {
                        error: e.to_string(),
                    }
                }
            };
            send_event(socket, &event).await;
        }
        Err(e) => {
            debug!(session = %session, error = %e, text, "Unrecognized event from console");
        }
    }
}

/// Serialize and send an event; returns false if the client is gone.
async fn send_event(socket: &mut WebSocket, event: &ConsoleEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize console event");
            true
        }
    }
}

fn extract_reply_target(payload: &serde_json::Map<String, Value>) -> Option<ReplyTarget> {
    let number = payload.get("msisdn").and_then(Value::as_str)?;
    let lang = payload.get("lang").and_then(Value::as_str)?;
    Some(ReplyTarget {
        number: number.to_string(),
        lang: lang.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn client_events_deserialize_by_wire_name() {
        let join: ClientEvent =
            serde_json::from_str(r#"{"event":"join","data":"Support interface connected"}"#)
                .unwrap();
        assert!(matches!(join, ClientEvent::Join { .. }));

        let reply: ClientEvent =
            serde_json::from_str(r#"{"event":"reply","text":"Hi there"}"#).unwrap();
        match reply {
            ClientEvent::Reply { text } => assert_eq!(text, "Hi there"),
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[test]
    fn reply_target_requires_address_and_lang() {
        let mut payload = Map::new();
        payload.insert("msisdn".into(), Value::String("+1555".into()));
        assert!(extract_reply_target(&payload).is_none());

        payload.insert("lang".into(), Value::String("es".into()));
        let target = extract_reply_target(&payload).unwrap();
        assert_eq!(target.number, "+1555");
        assert_eq!(target.lang, "es");
    }
}
