//! HTTP client for a Watson-style language-translator REST API.
//!
//! Two endpoints are used: `identify` (language detection, plain-text
//! body) and `translate` (JSON body). Both are versioned with a query
//! parameter per the Watson convention.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::Translator;
use crate::error::TranslateError;

/// API version pin sent on every request.
const API_VERSION: &str = "2018-05-01";

/// Bounded timeout for provider calls; the upstream webhook is waiting.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct WatsonTranslator {
    base_url: String,
    username: String,
    password: SecretString,
    client: reqwest::Client,
}

impl WatsonTranslator {
    pub fn new(base_url: &str, username: &str, password: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build translator HTTP client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password,
            client,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v3/{method}?version={API_VERSION}", self.base_url)
    }
}

#[async_trait]
impl Translator for WatsonTranslator {
    async fn detect(&self, text: &str) -> Result<String, TranslateError> {
        let resp = self
            .client
            .post(self.endpoint("identify"))
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(text.to_string())
            .send()
            .await
            .map_err(|e| TranslateError::Http(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TranslateError::AuthFailed);
        }
        if !resp.status().is_success() {
            return Err(TranslateError::DetectionFailed {
                reason: format!("provider returned {}", resp.status()),
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;
        parse_identify(&body)
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let body = serde_json::json!({
            "text": [text],
            "source": source,
            "target": target,
        });

        let resp = self
            .client
            .post(self.endpoint("translate"))
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslateError::Http(e.to_string()))?;

        match resp.status() {
            reqwest::StatusCode::UNAUTHORIZED => return Err(TranslateError::AuthFailed),
            reqwest::StatusCode::NOT_FOUND => {
                // Watson reports an unknown model for a pair it cannot serve.
                return Err(TranslateError::UnsupportedPair {
                    source_lang: source.to_string(),
                    target_lang: target.to_string(),
                });
            }
            status if !status.is_success() => {
                return Err(TranslateError::TranslationFailed {
                    source_lang: source.to_string(),
                    target_lang: target.to_string(),
                    reason: format!("provider returned {status}"),
                });
            }
            _ => {}
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;
        parse_translation(&body)
    }
}

/// Pull the most confident language out of an `identify` response.
fn parse_identify(body: &Value) -> Result<String, TranslateError> {
    body["languages"]
        .as_array()
        .and_then(|langs| langs.first())
        .and_then(|first| first["language"].as_str())
        .map(str::to_string)
        .ok_or_else(|| TranslateError::DetectionFailed {
            reason: "no language candidates in response".to_string(),
        })
}

/// Pull the first translation out of a `translate` response.
fn parse_translation(body: &Value) -> Result<String, TranslateError> {
    body["translations"]
        .as_array()
        .and_then(|ts| ts.first())
        .and_then(|first| first["translation"].as_str())
        .map(str::to_string)
        .ok_or_else(|| TranslateError::InvalidResponse("no translations in response".to_string()))
}
