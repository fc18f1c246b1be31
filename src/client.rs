//! Shared HTTP client with centralized failure classification.
//!
//! Every request goes out through one `reqwest::Client` configured with the
//! API base URL and JSON headers. Failed requests pass through a single
//! classifier that surfaces a user-facing toast, logs a diagnostic where
//! called for, and re-signals the failure to the caller unmodified.

use std::sync::Arc;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::toasts::{ToastKind, ToastStore};

/// Shared client for the fff API.
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    toasts: Arc<ToastStore>,
}

impl ApiClient {
    /// Build a client from configuration, emitting notifications to `toasts`.
    pub fn new(config: ClientConfig, toasts: Arc<ToastStore>) -> crate::error::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            config,
            toasts,
        })
    }

    /// The toast store this client notifies.
    pub fn toasts(&self) -> &Arc<ToastStore> {
        &self.toasts
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// GET a JSON endpoint with the given query parameters.
    pub(crate) async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        let result = self
            .http
            .get(&url)
            .query(query)
            .timeout(self.config.request_timeout)
            .send()
            .await;
        let resp = self.check(Method::GET, &url, result).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::InvalidBody(e.to_string()))
    }

    /// POST a JSON body, returning the raw successful response (used by the
    /// chat stream, which reads the body incrementally). No request timeout
    /// is applied here: reqwest's deadline covers the whole body, which
    /// would cut long-lived streams short.
    pub(crate) async fn post_raw<B>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let result = self.http.post(&url).json(body).send().await;
        self.check(Method::POST, &url, result).await
    }

    /// Run a completed request through the failure classifier.
    ///
    /// Successful responses pass through untouched. A failure emits exactly
    /// one error toast on the shared store and is re-signaled to the caller
    /// as [`ApiError`] — never swallowed.
    pub(crate) async fn check(
        &self,
        method: Method,
        url: &str,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<reqwest::Response, ApiError> {
        let err = match result {
            Ok(resp) if resp.status().is_success() => return Ok(resp),
            Ok(resp) => {
                let status = resp.status();
                let body: Value = resp.json().await.unwrap_or(Value::Null);
                classify_response(&method, url, status, &body)
            }
            Err(e) => {
                error!(error = %e, "No response from API");
                ApiError::NoResponse {
                    reason: e.to_string(),
                }
            }
        };

        self.toasts.add(err.to_string(), ToastKind::Error).await;
        Err(err)
    }
}

/// Map a failed response to its user-facing error.
///
/// Precedence, first match wins: 401, then 500, then an explicit `message`
/// string in the body, then the bare status code.
fn classify_response(method: &Method, url: &str, status: StatusCode, body: &Value) -> ApiError {
    match status {
        // Redirect-to-login is intentionally absent; 401 is surfaced only.
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::INTERNAL_SERVER_ERROR => ApiError::Server,
        _ => {
            if let Some(message) = body.get("message").and_then(Value::as_str) {
                error!(%method, url, body = %body, "API error");
                ApiError::Application {
                    message: message.to_string(),
                }
            } else {
                error!(%method, url, status = status.as_u16(), body = %body, "API unknown error");
                ApiError::Status {
                    status: status.as_u16(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(status: u16, body: Value) -> ApiError {
        classify_response(
            &Method::GET,
            "http://localhost/v1/players",
            StatusCode::from_u16(status).unwrap(),
            &body,
        )
    }

    #[test]
    fn classifies_401_as_authentication_error() {
        let err = classify(401, json!({"message": "ignored for 401"}));
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(err.to_string(), "Authentication error");
    }

    #[test]
    fn classifies_500_as_internal_server_error() {
        let err = classify(500, Value::Null);
        assert!(matches!(err, ApiError::Server));
        assert_eq!(err.to_string(), "Internal server error.");
    }

    #[test]
    fn body_message_is_used_verbatim() {
        let err = classify(404, json!({"message": "Player not found"}));
        assert!(matches!(err, ApiError::Application { .. }));
        assert_eq!(err.to_string(), "Player not found");
    }

    #[test]
    fn non_string_message_falls_through_to_status() {
        let err = classify(404, json!({"message": 42}));
        assert_eq!(err.to_string(), "Unknown error: 404");
    }

    #[test]
    fn missing_message_uses_status_code() {
        let err = classify(503, json!({}));
        assert!(matches!(err, ApiError::Status { status: 503 }));
        assert_eq!(err.to_string(), "Unknown error: 503");
    }

    #[test]
    fn url_join_trims_trailing_slash() {
        let toasts = ToastStore::new();
        let client = ApiClient::new(ClientConfig::new("http://localhost:8000/"), toasts).unwrap();
        assert_eq!(client.url("/v1/stats"), "http://localhost:8000/v1/stats");
    }
}
