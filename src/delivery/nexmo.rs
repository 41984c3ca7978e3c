//! HTTP client for the Nexmo `sms/json` REST API.
//!
//! The API always answers 200; per-message success is a `status` code
//! inside the body ("0" means accepted), so the response is parsed and a
//! non-zero status surfaces as a delivery error.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::{SmsEncoding, SmsSender};
use crate::error::DeliveryError;

const DEFAULT_BASE_URL: &str = "https://rest.nexmo.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct NexmoSender {
    api_key: String,
    api_secret: SecretString,
    from: String,
    base_url: String,
    client: reqwest::Client,
}

impl NexmoSender {
    pub fn new(api_key: &str, api_secret: SecretString, from: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build SMS HTTP client");
        Self {
            api_key: api_key.to_string(),
            api_secret,
            from: from.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }
}

#[async_trait]
impl SmsSender for NexmoSender {
    async fn send(
        &self,
        to: &str,
        text: &str,
        encoding: SmsEncoding,
    ) -> Result<(), DeliveryError> {
        if to.trim().is_empty() {
            return Err(DeliveryError::InvalidDestination(to.to_string()));
        }

        let body = serde_json::json!({
            "api_key": self.api_key,
            "api_secret": self.api_secret.expose_secret(),
            "from": self.from,
            "to": to,
            "text": text,
            "type": encoding.as_str(),
        });

        let resp = self
            .client
            .post(format!("{}/sms/json", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(DeliveryError::Http(format!(
                "provider returned {}",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;
        parse_send_response(&body)
    }
}

/// Check each message part's status code in a `sms/json` response.
fn parse_send_response(body: &Value) -> Result<(), DeliveryError> {
    let messages = body["messages"]
        .as_array()
        .ok_or_else(|| DeliveryError::InvalidResponse("no messages array".to_string()))?;

    if messages.is_empty() {
        return Err(DeliveryError::InvalidResponse(
            "empty messages array".to_string(),
        ));
    }

    for message in messages {
        let status = message["status"].as_str().unwrap_or("");
        if status != "0" {
            let reason = message["error-text"]
                .as_str()
                .unwrap_or("unknown provider error")
                .to_string();
            return Err(DeliveryError::Rejected { reason });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_status_is_ok() {
        let body = serde_json::json!({
            "message-count": "1",
            "messages": [{"status": "0", "message-id": "0A0000"}]
        });
        assert!(parse_send_response(&body).is_ok());
    }

    #[test]
    fn non_zero_status_is_rejected_with_reason() {
        let body = serde_json::json!({
            "message-count": "1",
            "messages": [{"status": "4", "error-text": "Bad Credentials"}]
        });
        match parse_send_response(&body) {
            Err(DeliveryError::Rejected { reason }) => assert_eq!(reason, "Bad Credentials"),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn multipart_fails_if_any_part_fails() {
        let body = serde_json::json!({
            "message-count": "2",
            "messages": [
                {"status": "0", "message-id": "0A0000"},
                {"status": "1", "error-text": "Throttled"},
            ]
        });
        assert!(parse_send_response(&body).is_err());
    }

    #[test]
    fn missing_messages_is_invalid_response() {
        let body = serde_json::json!({"message-count": "1"});
        assert!(matches!(
            parse_send_response(&body),
            Err(DeliveryError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn empty_destination_is_rejected_before_any_request() {
        let sender = NexmoSender::new("key", SecretString::from("secret"), "+15550000000");
        let err = sender.send("  ", "hi", SmsEncoding::Text).await.unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidDestination(_)));
    }

    #[test]
    fn encoding_wire_names() {
        assert_eq!(SmsEncoding::Text.as_str(), "text");
        assert_eq!(SmsEncoding::Unicode.as_str(), "unicode");
    }
}
