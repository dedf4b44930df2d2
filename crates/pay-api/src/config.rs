//! # Backend Configuration
//!
//! Endpoints and credentials for the checkout backend.
//! Loaded from environment variables.

use pay_core::{PaymentError, PaymentResult};
use reqwest::Url;
use std::env;
use std::time::Duration;

pub const DEFAULT_PAYMENTS_URL: &str = "https://payments.bigcommerce.com";

/// Checkout backend configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Storefront base URL (order submission, payment methods, checkouts)
    pub base_url: String,

    /// Payments service base URL (payment submission)
    pub payments_url: String,

    /// Bearer token, if the backend requires one
    pub api_token: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `CHECKOUT_BASE_URL`
    ///
    /// Optional env vars:
    /// - `CHECKOUT_PAYMENTS_URL` (default `https://payments.bigcommerce.com`)
    /// - `CHECKOUT_API_TOKEN`
    /// - `CHECKOUT_HTTP_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url = env::var("CHECKOUT_BASE_URL").map_err(|_| {
            PaymentError::MissingConfiguration("CHECKOUT_BASE_URL not set".to_string())
        })?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(PaymentError::MissingConfiguration(
                "CHECKOUT_BASE_URL must be an http(s) URL".to_string(),
            ));
        }

        let mut config = Self::new(base_url);

        if let Ok(url) = env::var("CHECKOUT_PAYMENTS_URL") {
            config = config.with_payments_url(url);
        }

        if let Ok(token) = env::var("CHECKOUT_API_TOKEN") {
            if !token.is_empty() {
                config = config.with_api_token(token);
            }
        }

        if let Ok(raw) = env::var("CHECKOUT_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                PaymentError::MissingConfiguration(format!(
                    "CHECKOUT_HTTP_TIMEOUT_SECS must be a number of seconds (got {})",
                    raw
                ))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_slash(base_url.into()),
            payments_url: DEFAULT_PAYMENTS_URL.to_string(),
            api_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_payments_url(mut self, url: impl Into<String>) -> Self {
        self.payments_url = trim_slash(url.into());
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn order_url(&self) -> String {
        format!("{}/internalapi/v1/checkout/order", self.base_url)
    }

    pub fn payment_url(&self) -> String {
        format!("{}/api/public/v1/orders/payments", self.payments_url)
    }

    pub fn payment_method_url(&self, method_id: &str) -> PaymentResult<String> {
        self.storefront_url(&["api", "storefront", "payments", method_id])
    }

    pub fn checkout_url(&self, checkout_id: &str) -> PaymentResult<String> {
        self.storefront_url(&["api", "storefront", "checkouts", checkout_id])
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn storefront_url(&self, segments: &[&str]) -> PaymentResult<String> {
        let invalid = || {
            PaymentError::MissingConfiguration(format!(
                "CHECKOUT_BASE_URL is not a valid base URL ({})",
                self.base_url
            ))
        };

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// Authorization header value
    pub fn auth_header(&self) -> Option<String> {
        self.api_token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
