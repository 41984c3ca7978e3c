//! Pipeline data model — inbound messages, translation outcomes, receipts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A message delivered by the SMS provider's inbound webhook.
///
/// Only `text` is interpreted; every other field the provider sends
/// (`msisdn`, `to`, `messageId`, timestamps, …) is carried as opaque
/// passthrough data and forwarded to the console untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub text: String,
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
}

/// Result of running text through the translation step once.
///
/// Invariant: `translation.is_some() == translated`. When no translation
/// happened the original text stands in for "what to forward".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationOutcome {
    /// The original text, always retained.
    pub text: String,
    /// Detected source language code.
    pub lang: String,
    /// Translated text, present only when a translation was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    pub translated: bool,
}

impl TranslationOutcome {
    /// Text already in the target language; no translate call was made.
    pub fn untranslated(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: lang.into(),
            translation: None,
            translated: false,
        }
    }

    /// Text was translated out of `lang`.
    pub fn translated(
        text: impl Into<String>,
        lang: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            lang: lang.into(),
            translation: Some(translation.into()),
            translated: true,
        }
    }

    /// The text to forward onward: the translation when one was made,
    /// otherwise the original.
    pub fn forward_text(&self) -> &str {
        self.translation.as_deref().unwrap_or(&self.text)
    }
}

/// Build the payload pushed to operator sessions for one inbound message.
///
/// The outcome's fields are merged over the message's passthrough fields;
/// on a key collision the translation side wins. A degraded payload (the
/// translation step failed) is flagged so the console can render it as
/// untranslated rather than dropping the message.
pub fn notification_payload(
    outcome: &TranslationOutcome,
    message: &InboundMessage,
    degraded: bool,
) -> Map<String, Value> {
    let mut payload = message.passthrough.clone();
    payload.insert("text".into(), Value::String(outcome.text.clone()));
    payload.insert("lang".into(), Value::String(outcome.lang.clone()));
    payload.insert("translated".into(), Value::Bool(outcome.translated));
    if let Some(translation) = &outcome.translation {
        payload.insert("translation".into(), Value::String(translation.clone()));
    }
    if degraded {
        payload.insert("degraded".into(), Value::Bool(true));
    }
    payload
}

/// An operator reply headed back to the original sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundReply {
    /// Reply text, in the operator's language.
    pub text: String,
    /// Destination address.
    pub number: String,
    /// Language the original sender used.
    pub lang: String,
}

/// Terminal status of an outbound send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Failed,
}

/// Returned to the console after an outbound send completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    pub message_status: MessageStatus,
    pub translated: bool,
    /// The final text that went out on the wire.
    pub message: String,
}

impl DeliveryReceipt {
    pub fn sent(translated: bool, message: impl Into<String>) -> Self {
        Self {
            message_status: MessageStatus::Sent,
            translated,
            message: message.into(),
        }
    }
}
