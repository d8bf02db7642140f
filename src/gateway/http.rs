//! `reqwest`-backed gateway.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::auth::AuthContext;
use crate::config::ClientConfig;
use crate::error::{ConfigError, HttpError};
use crate::gateway::{ApiGateway, Method};

/// Gateway talking JSON over HTTP to the booking backend.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    auth: AuthContext,
}

impl HttpGateway {
    /// # Errors
    /// Returns `ConfigError::ClientBuild` if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, auth: AuthContext) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ConfigError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    #[instrument(skip(self, body))]
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, HttpError> {
        let url = self.url(path);
        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        if let Some(token) = self.auth.bearer_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        debug!("Sending request");
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Backend unreachable");
            HttpError::unreachable(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| HttpError::unreachable(format!("Failed to read response: {e}")))?;
        let payload = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        if status.is_success() {
            debug!(status = status.as_u16(), "Request succeeded");
            return Ok(payload);
        }

        let message = error_message(&payload).unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| text.clone())
        });
        debug!(status = status.as_u16(), message = %message, "Request failed");
        Err(HttpError::from_status(status.as_u16(), message))
    }
}

/// Backend error bodies carry `error` or `message`.
fn error_message(payload: &Value) -> Option<String> {
    payload
        .get("error")
        .or_else(|| payload.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_joining() {
        let config = ClientConfig {
            api_base_url: "http://localhost:5000/api/".to_string(),
            ..ClientConfig::default()
        };
        let gateway = HttpGateway::new(&config, AuthContext::new()).unwrap();
        assert_eq!(gateway.url("orders/4"), "http://localhost:5000/api/orders/4");
        assert_eq!(gateway.url("/users/current/orders"), "http://localhost:5000/api/users/current/orders");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(&json!({"error": "Unauthorized"})).as_deref(), Some("Unauthorized"));
        assert_eq!(error_message(&json!({"message": "gone"})).as_deref(), Some("gone"));
        assert_eq!(error_message(&json!([1])), None);
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let config = ClientConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_ms: 500,
            ..ClientConfig::default()
        };
        let gateway = HttpGateway::new(&config, AuthContext::new()).unwrap();
        let err = gateway.get("orders").await.unwrap_err();
        assert_eq!(err.kind, crate::error::HttpErrorKind::NetworkUnreachable);
    }
}
