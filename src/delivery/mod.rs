//! Outbound SMS delivery capability.

pub mod nexmo;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RelayConfig;
use crate::error::DeliveryError;

pub use nexmo::NexmoSender;

/// Transport encoding for an outbound SMS.
///
/// Machine-translated text can land outside the plain GSM repertoire, so
/// the outbound path picks the encoding by translation status instead of
/// doing real script detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsEncoding {
    /// Plain GSM 03.38 text.
    Text,
    /// UCS-2, for text that may carry arbitrary scripts.
    Unicode,
}

impl SmsEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Unicode => "unicode",
        }
    }
}

/// An outbound SMS provider.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `text` to `to` using the given transport encoding.
    async fn send(&self, to: &str, text: &str, encoding: SmsEncoding)
        -> Result<(), DeliveryError>;
}

/// Create the configured SMS provider.
pub fn create_sender(config: &RelayConfig) -> Arc<dyn SmsSender> {
    tracing::info!(from = %config.sms_sender, "Using Nexmo SMS sender");
    Arc::new(NexmoSender::new(
        &config.sms_api_key,
        config.sms_api_secret.clone(),
        &config.sms_sender,
    ))
}
