//! Client configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "FFF_API_URL";

/// Model requested on the chat completions endpoint.
pub const DEFAULT_CHAT_MODEL: &str = "openai-with-spice";

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the fff API, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Model name sent with chat completion requests.
    pub chat_model: String,
    /// Per-request timeout. Does not apply to an already-established chat
    /// stream.
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Read the configuration from the environment (`FFF_API_URL`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(API_URL_VAR)
            .map_err(|_| ConfigError::MissingEnvVar(API_URL_VAR.to_string()))?;
        if base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: API_URL_VAR.to_string(),
                message: "base URL must not be empty".to_string(),
            });
        }
        Ok(Self::new(base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ClientConfig::new("http://localhost:8000");
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.chat_model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
