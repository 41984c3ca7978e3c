//! Language detection and translation capability.

pub mod watson;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RelayConfig;
use crate::error::TranslateError;

pub use watson::WatsonTranslator;

/// A machine-translation provider.
///
/// Both operations are network-bound and may fail independently of
/// each other; the pipeline branches on every result.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Detect the language of `text`, returning a language code ("en", "es", …).
    async fn detect(&self, text: &str) -> Result<String, TranslateError>;

    /// Translate `text` from `source` to `target`.
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError>;
}

/// Create the configured translation provider.
pub fn create_translator(config: &RelayConfig) -> Arc<dyn Translator> {
    tracing::info!(url = %config.translator_url, "Using HTTP translator");
    Arc::new(WatsonTranslator::new(
        &config.translator_url,
        &config.translator_username,
        config.translator_password.clone(),
    ))
}
