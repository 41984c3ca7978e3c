//! The two-path translation-relay pipeline.
//!
//! Inbound: detect → (maybe) translate → merge → publish to the console.
//! Outbound: (maybe) translate → send SMS, picking the transport encoding
//! by translation status.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::model::{
    notification_payload, DeliveryReceipt, InboundMessage, OutboundReply, TranslationOutcome,
};
use crate::console::ConsoleHub;
use crate::delivery::{SmsEncoding, SmsSender};
use crate::error::Result;
use crate::translate::Translator;

pub struct RelayPipeline {
    translator: Arc<dyn Translator>,
    sms: Arc<dyn SmsSender>,
    hub: Arc<ConsoleHub>,
    operator_lang: String,
}

impl RelayPipeline {
    pub fn new(
        translator: Arc<dyn Translator>,
        sms: Arc<dyn SmsSender>,
        hub: Arc<ConsoleHub>,
        operator_lang: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            translator,
            sms,
            hub,
            operator_lang: operator_lang.into(),
        })
    }

    pub fn hub(&self) -> &Arc<ConsoleHub> {
        &self.hub
    }

    /// Full inbound path: detect, translate, merge, publish.
    ///
    /// When the detected language is already the operator language no
    /// translate call is made and the original text stands.
    ///
    /// Never fails — a detection or translation failure produces a
    /// degraded payload (untranslated, flagged) so the operator still
    /// sees the message, and the failure goes to the log. When detection
    /// succeeded but translation failed, the detected language is kept so
    /// replies still go back in the sender's language. The HTTP
    /// acknowledgment to the provider is handled by the caller and is
    /// decoupled from this path entirely.
    pub async fn process_inbound(&self, message: InboundMessage) -> Map<String, Value> {
        let text = message.text.as_str();
        let (outcome, degraded) = match self.translator.detect(text).await {
            Ok(detected) if detected == self.operator_lang => {
                (TranslationOutcome::untranslated(text, detected), false)
            }
            Ok(detected) => {
                match self
                    .translator
                    .translate(text, &detected, &self.operator_lang)
                    .await
                {
                    Ok(translation) => (
                        TranslationOutcome::translated(text, detected, translation),
                        false,
                    ),
                    Err(e) => {
                        warn!(error = %e, lang = %detected, "Inbound translation failed; forwarding degraded");
                        (TranslationOutcome::untranslated(text, detected), true)
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Language detection failed; forwarding degraded");
                (
                    TranslationOutcome::untranslated(text, self.operator_lang.as_str()),
                    true,
                )
            }
        };

        let payload = notification_payload(&outcome, &message, degraded);
        self.hub.publish(payload.clone());
        payload
    }

    /// Outbound path: translate the operator's reply into the sender's
    /// language (unless they already share one) and send it as an SMS.
    ///
    /// Translated text may carry any script, so it goes out as Unicode;
    /// operator-language text uses the plain encoding.
    pub async fn handle_outbound(&self, reply: OutboundReply) -> Result<DeliveryReceipt> {
        if reply.lang == self.operator_lang {
            self.sms
                .send(&reply.number, &reply.text, SmsEncoding::Text)
                .await?;
            info!(to = %reply.number, translated = false, "Reply sent");
            return Ok(DeliveryReceipt::sent(false, reply.text));
        }

        let translation = self
            .translator
            .translate(&reply.text, &self.operator_lang, &reply.lang)
            .await?;
        self.sms
            .send(&reply.number, &translation, SmsEncoding::Unicode)
            .await?;
        info!(to = %reply.number, lang = %reply.lang, translated = true, "Reply sent");
        Ok(DeliveryReceipt::sent(true, translation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeliveryError, Error, TranslateError};
    use crate::relay::MessageStatus;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Scripted translator: a fixed detection result and a fixed
    /// translation, recording every translate call.
    struct StubTranslator {
        detect_lang: Option<String>,
        translation: Option<String>,
        translate_calls: Mutex<Vec<(String, String, String)>>,
    }

    impl StubTranslator {
        fn new(detect_lang: Option<&str>, translation: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                detect_lang: detect_lang.map(str::to_string),
                translation: translation.map(str::to_string),
                translate_calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Translator for StubTranslator {
        async fn detect(&self, _text: &str) -> std::result::Result<String, TranslateError> {
            self.detect_lang
                .clone()
                .ok_or_else(|| TranslateError::DetectionFailed {
                    reason: "stubbed failure".into(),
                })
        }

        async fn translate(
            &self,
            text: &str,
            source: &str,
            target: &str,
        ) -> std::result::Result<String, TranslateError> {
            self.translate_calls
                .lock()
                .await
                .push((text.to_string(), source.to_string(), target.to_string()));
            self.translation
                .clone()
                .ok_or_else(|| TranslateError::TranslationFailed {
                    source_lang: source.to_string(),
                    target_lang: target.to_string(),
                    reason: "stubbed failure".into(),
                })
        }
    }

    /// Recording SMS sender that can be told to fail.
    struct RecordingSms {
        sent: Mutex<Vec<(String, String, SmsEncoding)>>,
        fail: bool,
    }

    impl RecordingSms {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl SmsSender for RecordingSms {
        async fn send(
            &self,
            to: &str,
            text: &str,
            encoding: SmsEncoding,
        ) -> std::result::Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Rejected {
                    reason: "stubbed rejection".into(),
                });
            }
            self.sent
                .lock()
                .await
                .push((to.to_string(), text.to_string(), encoding));
            Ok(())
        }
    }

    fn pipeline(
        translator: Arc<StubTranslator>,
        sms: Arc<RecordingSms>,
    ) -> Arc<RelayPipeline> {
        RelayPipeline::new(translator, sms, ConsoleHub::new(), "en")
    }

    fn inbound(text: &str) -> InboundMessage {
        let mut passthrough = Map::new();
        passthrough.insert("msisdn".into(), Value::String("+1555".into()));
        InboundMessage {
            text: text.into(),
            passthrough,
        }
    }

    #[tokio::test]
    async fn inbound_english_skips_translation() {
        let translator = StubTranslator::new(Some("en"), None);
        let p = pipeline(Arc::clone(&translator), RecordingSms::new(false));

        let payload = p.process_inbound(inbound("Hello")).await;

        assert_eq!(payload["translated"], false);
        assert_eq!(payload["lang"], "en");
        assert_eq!(payload["text"], "Hello");
        assert_eq!(payload["msisdn"], "+1555");
        assert!(!payload.contains_key("translation"));
        assert!(translator.translate_calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn inbound_foreign_text_is_translated() {
        let translator = StubTranslator::new(Some("es"), Some("Hello"));
        let p = pipeline(Arc::clone(&translator), RecordingSms::new(false));

        let payload = p.process_inbound(inbound("Hola")).await;

        assert_eq!(payload["translated"], true);
        assert_eq!(payload["translation"], "Hello");
        assert_eq!(payload["lang"], "es");
        assert_eq!(payload["msisdn"], "+1555");

        let calls = translator.translate_calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            ("Hola".to_string(), "es".to_string(), "en".to_string())
        );
    }

    #[tokio::test]
    async fn inbound_detection_failure_degrades_instead_of_failing() {
        let translator = StubTranslator::new(None, None);
        let p = pipeline(translator, RecordingSms::new(false));
        let mut rx = p.hub().subscribe();

        let payload = p.process_inbound(inbound("Hola")).await;

        assert_eq!(payload["degraded"], true);
        assert_eq!(payload["translated"], false);
        assert_eq!(payload["text"], "Hola");

        // Degraded messages are still published to the console.
        match rx.recv().await.unwrap() {
            crate::console::ConsoleEvent::NewMessage { payload } => {
                assert_eq!(payload["degraded"], true);
            }
            other => panic!("expected NewMessage, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn inbound_translation_failure_degrades_but_keeps_detected_lang() {
        let translator = StubTranslator::new(Some("es"), None);
        let p = pipeline(translator, RecordingSms::new(false));

        let payload = p.process_inbound(inbound("Hola")).await;

        assert_eq!(payload["degraded"], true);
        assert_eq!(payload["translated"], false);
        // Detection succeeded, so the sender's language survives for
        // reply targeting even though translation failed.
        assert_eq!(payload["lang"], "es");
        assert_eq!(payload["text"], "Hola");
    }

    #[tokio::test]
    async fn outbound_english_sends_plain_verbatim() {
        let translator = StubTranslator::new(None, None);
        let sms = RecordingSms::new(false);
        let p = pipeline(Arc::clone(&translator), Arc::clone(&sms));

        let receipt = p
            .handle_outbound(OutboundReply {
                text: "Hi there".into(),
                number: "+1555".into(),
                lang: "en".into(),
            })
            .await
            .unwrap();

        assert_eq!(receipt.message_status, MessageStatus::Sent);
        assert!(!receipt.translated);
        assert_eq!(receipt.message, "Hi there");

        let sent = sms.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            ("+1555".to_string(), "Hi there".to_string(), SmsEncoding::Text)
        );
        assert!(translator.translate_calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn outbound_foreign_translates_and_sends_unicode() {
        let translator = StubTranslator::new(None, Some("Hola"));
        let sms = RecordingSms::new(false);
        let p = pipeline(Arc::clone(&translator), Arc::clone(&sms));

        let receipt = p
            .handle_outbound(OutboundReply {
                text: "Hi there".into(),
                number: "+1555".into(),
                lang: "es".into(),
            })
            .await
            .unwrap();

        assert!(receipt.translated);
        assert_eq!(receipt.message, "Hola");

        let sent = sms.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            ("+1555".to_string(), "Hola".to_string(), SmsEncoding::Unicode)
        );
        let calls = translator.translate_calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            ("Hi there".to_string(), "en".to_string(), "es".to_string())
        );
    }

    #[tokio::test]
    async fn outbound_translation_failure_is_an_error() {
        let translator = StubTranslator::new(None, None);
        let sms = RecordingSms::new(false);
        let p = pipeline(translator, Arc::clone(&sms));

        let err = p
            .handle_outbound(OutboundReply {
                text: "Hi".into(),
                number: "+1555".into(),
                lang: "es".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Translate(_)));
        assert!(sms.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn outbound_delivery_failure_is_an_error() {
        let translator = StubTranslator::new(None, None);
        let p = pipeline(translator, RecordingSms::new(true));

        let err = p
            .handle_outbound(OutboundReply {
                text: "Hi".into(),
                number: "+1555".into(),
                lang: "en".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Delivery(_)));
    }
}
