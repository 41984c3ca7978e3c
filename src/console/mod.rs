//! Operator console — notification hub and WebSocket sessions.

pub mod ws;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::info;

use crate::relay::DeliveryReceipt;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Events sent to connected operator sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ConsoleEvent {
    /// A new inbound message, translated (or degraded) and merged with
    /// the provider's passthrough fields.
    NewMessage { payload: Map<String, Value> },
    /// Confirmation for a reply submitted over this session's socket.
    ReplyStatus {
        #[serde(flatten)]
        receipt: DeliveryReceipt,
    },
    /// A reply submitted over this session's socket could not be sent.
    ReplyFailed { error: String },
}

/// Fan-out hub pushing inbound-message events to all connected sessions.
///
/// Publishing is fire-and-forget: a slow or absent subscriber never
/// blocks the pipeline, and no delivery confirmation is tracked.
pub struct ConsoleHub {
    tx: broadcast::Sender<ConsoleEvent>,
}

impl ConsoleHub {
    pub fn new() -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self { tx })
    }

    /// Subscribe to message events. Each WS session calls this on connect.
    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.tx.subscribe()
    }

    /// Publish an inbound-message payload to all connected sessions.
    pub fn publish(&self, payload: Map<String, Value>) {
        let from = payload.get("msisdn").and_then(Value::as_str).unwrap_or("?");
        let lang = payload.get("lang").and_then(Value::as_str).unwrap_or("?");
        let translated = payload
            .get("translated")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        info!(from, lang, translated, "Publishing inbound message to console");
        // Ok if no sessions are connected yet
        let _ = self.tx.send(ConsoleEvent::NewMessage { payload });
    }

    /// Number of currently connected sessions.
    pub fn session_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
