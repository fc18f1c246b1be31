//! Error types for the fff API client.

/// Top-level error type for the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// A failed API request, one variant per classification outcome.
///
/// The `Display` text of each variant is the exact message surfaced to the
/// user as a toast, so callers and the notification layer never disagree on
/// wording.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The API returned 401. Recoverable by re-authenticating; the client
    /// only surfaces it, it does not force a redirect.
    #[error("Authentication error")]
    Unauthorized,

    /// The API returned 500.
    #[error("Internal server error.")]
    Server,

    /// The response body carried an explicit `message` field; its text is
    /// authoritative and shown verbatim.
    #[error("{message}")]
    Application { message: String },

    /// Any other non-success status without an application message.
    #[error("Unknown error: {status}")]
    Status { status: u16 },

    /// The request produced no response at all (connect, DNS, timeout).
    #[error("No response from API")]
    NoResponse { reason: String },

    /// A successful response whose body could not be decoded.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    /// A chat stream failed after it had started. Terminal for that stream;
    /// not routed through the failure classifier.
    #[error("Chat stream interrupted: {0}")]
    Stream(String),
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_matches_toast_wording() {
        assert_eq!(ApiError::Unauthorized.to_string(), "Authentication error");
        assert_eq!(ApiError::Server.to_string(), "Internal server error.");
        assert_eq!(
            ApiError::Application {
                message: "Player not found".into()
            }
            .to_string(),
            "Player not found"
        );
        assert_eq!(
            ApiError::Status { status: 503 }.to_string(),
            "Unknown error: 503"
        );
        assert_eq!(
            ApiError::NoResponse {
                reason: "connection refused".into()
            }
            .to_string(),
            "No response from API"
        );
    }
}
