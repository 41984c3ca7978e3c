//! Environment-based configuration.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default Watson-compatible language translator endpoint.
const DEFAULT_TRANSLATOR_URL: &str =
    "https://gateway.watsonplatform.net/language-translator/api";

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Sender address outbound SMS are sent from.
    pub sms_sender: String,
    /// Language the operator reads and writes in.
    pub operator_lang: String,
    /// Base URL of the translation provider.
    pub translator_url: String,
    /// Translation provider credentials.
    pub translator_username: String,
    pub translator_password: SecretString,
    /// SMS provider credentials.
    pub sms_api_key: String,
    pub sms_api_secret: SecretString,
}

impl RelayConfig {
    /// Read configuration from the environment.
    ///
    /// Missing credentials are an error; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = match std::env::var("PORT") {
            Ok(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("not a valid port number: {s}"),
            })?,
            Err(_) => 8000,
        };

        let sms_sender = require_env("SMS_SENDER")?;

        let operator_lang =
            std::env::var("OPERATOR_LANG").unwrap_or_else(|_| "en".to_string());

        let translator_url = std::env::var("TRANSLATOR_URL")
            .unwrap_or_else(|_| DEFAULT_TRANSLATOR_URL.to_string());
        let translator_username = require_env("TRANSLATOR_USERNAME")?;
        let translator_password = SecretString::from(require_env("TRANSLATOR_PASSWORD")?);

        let sms_api_key = require_env("SMS_API_KEY")?;
        let sms_api_secret = SecretString::from(require_env("SMS_API_SECRET")?);

        Ok(Self {
            port,
            sms_sender,
            operator_lang,
            translator_url,
            translator_username,
            translator_password,
            sms_api_key,
            sms_api_secret,
        })
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Whether the process is running in production mode.
///
/// Outside production a local `.env` file is loaded at startup.
pub fn is_production() -> bool {
    std::env::var("RELAY_ENV")
        .map(|v| v == "production")
        .unwrap_or(false)
}
