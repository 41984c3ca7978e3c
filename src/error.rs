//! Error types for the relay.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Translation error: {0}")]
    Translate(#[from] TranslateError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Translation capability errors.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("Language detection failed: {reason}")]
    DetectionFailed { reason: String },

    #[error("Translation {source_lang}->{target_lang} failed: {reason}")]
    TranslationFailed {
        source_lang: String,
        target_lang: String,
        reason: String,
    },

    #[error("Unsupported language pair {source_lang}->{target_lang}")]
    UnsupportedPair {
        source_lang: String,
        target_lang: String,
    },

    #[error("Translator authentication failed")]
    AuthFailed,

    #[error("Invalid response from translator: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// SMS delivery capability errors.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid destination address: {0}")]
    InvalidDestination(String),

    #[error("Provider rejected message: {reason}")]
    Rejected { reason: String },

    #[error("Invalid response from delivery provider: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Result type alias for the relay.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_failed_carries_language_pair_in_message() {
        let err = TranslateError::TranslationFailed {
            source_lang: "es".into(),
            target_lang: "en".into(),
            reason: "quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "Translation es->en failed: quota exceeded");
        // Language codes are plain data, not an underlying error cause.
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn unsupported_pair_display() {
        let err = TranslateError::UnsupportedPair {
            source_lang: "en".into(),
            target_lang: "xx".into(),
        };
        assert_eq!(err.to_string(), "Unsupported language pair en->xx");
    }
}
