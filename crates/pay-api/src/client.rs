//! # Checkout HTTP Client
//!
//! Thin JSON client over `reqwest` for the checkout backend. Every request
//! carries an `X-Request-Id`; failures map onto `PaymentError`.

use crate::config::BackendConfig;
use pay_core::{PaymentError, PaymentResult};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

/// Maps a non-2xx status and body to an error
pub type StatusErrorMapper = fn(StatusCode, String) -> PaymentError;

/// JSON client for the checkout backend
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    config: BackendConfig,
    client: Client,
}

impl CheckoutClient {
    pub fn new(config: BackendConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(BackendConfig::from_env()?)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("X-Request-Id", Uuid::new_v4().to_string())
            .header("Accept", "application/json");

        match self.config.auth_header() {
            Some(auth) => request.header("Authorization", auth),
            None => request,
        }
    }

    /// GET `url` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        on_status: StatusErrorMapper,
    ) -> PaymentResult<T> {
        debug!(url, "GET");
        let body = self.send(self.client.get(url), on_status).await?;

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse response from {}: {}", url, e))
        })
    }

    /// POST `body` as JSON to `url`, ignoring the response body
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        on_status: StatusErrorMapper,
    ) -> PaymentResult<()> {
        debug!(url, "POST");
        self.send(self.client.post(url).json(body), on_status)
            .await
            .map(|_| ())
    }

    async fn send(
        &self,
        request: RequestBuilder,
        on_status: StatusErrorMapper,
    ) -> PaymentResult<String> {
        let response = self
            .prepare(request)
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Checkout backend error: status={}, body={}", status, body);
            return Err(on_status(status, error_message(status, &body)));
        }

        Ok(body)
    }
}

/// Prefer the backend's own error title/detail over the raw body
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let detail = parsed.as_ref().and_then(|v| {
        v.get("detail")
            .or_else(|| v.get("title"))
            .or_else(|| v.get("message"))
            .and_then(|m| m.as_str())
    });

    match detail {
        Some(detail) => format!("HTTP {}: {}", status.as_u16(), detail),
        None => format!("HTTP {}: {}", status.as_u16(), body),
    }
}

/// Generic mapper for reads
pub fn provider_error(status: StatusCode, message: String) -> PaymentError {
    if status.is_server_error() {
        PaymentError::NetworkError(message)
    } else {
        PaymentError::ProviderError {
            provider: "checkout".to_string(),
            message,
        }
    }
}
