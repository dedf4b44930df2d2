//! # CyberSource Configuration
//!
//! Settings for the Cardinal session. Loaded from environment variables.

use crate::cardinal::{CardinalConfiguration, LoggingConfiguration, PaymentViewConfiguration};
use pay_core::PaymentError;
use std::env;
use std::time::Duration;

/// Default bound on the wait for `payments.validated`
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(600);

/// Cardinal session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyberSourceConfig {
    /// Cardinal console logging (`off`, `on`, `verbose`)
    pub log_level: String,

    /// Challenge presentation (`modal` or `inline`)
    pub view: String,

    /// Show Cardinal's loading indicator
    pub display_loading: bool,

    /// Bound on the wait for a validation outcome; `None` waits forever
    pub validation_timeout: Option<Duration>,
}

impl CyberSourceConfig {
    /// Defaults: logging off, modal challenge, 600s validation timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `CARDINAL_LOG_LEVEL` (default `off`)
    /// - `CARDINAL_VALIDATION_TIMEOUT_SECS` (default 600, `0` disables)
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let mut config = Self::default();

        if let Ok(level) = env::var("CARDINAL_LOG_LEVEL") {
            if !matches!(level.as_str(), "off" | "on" | "verbose") {
                return Err(PaymentError::MissingConfiguration(format!(
                    "CARDINAL_LOG_LEVEL must be off, on or verbose (got {})",
                    level
                )));
            }
            config.log_level = level;
        }

        if let Ok(raw) = env::var("CARDINAL_VALIDATION_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                PaymentError::MissingConfiguration(format!(
                    "CARDINAL_VALIDATION_TIMEOUT_SECS must be a number of seconds (got {})",
                    raw
                ))
            })?;
            config.validation_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Builder: set the validation timeout
    pub fn with_validation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.validation_timeout = timeout;
        self
    }

    /// Builder: set the log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Payload for `Cardinal.configure`
    pub fn cardinal_configuration(&self) -> CardinalConfiguration {
        CardinalConfiguration {
            logging: Some(LoggingConfiguration {
                level: self.log_level.clone(),
            }),
            payment: Some(PaymentViewConfiguration {
                view: Some(self.view.clone()),
                framework: None,
                display_loading: Some(self.display_loading),
            }),
        }
    }
}

impl Default for CyberSourceConfig {
    fn default() -> Self {
        Self {
            log_level: "off".to_string(),
            view: "modal".to_string(),
            display_loading: false,
            validation_timeout: Some(DEFAULT_VALIDATION_TIMEOUT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CyberSourceConfig::default();

        assert_eq!(config.log_level, "off");
        assert_eq!(config.validation_timeout, Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_cardinal_configuration() {
        let config = CyberSourceConfig::default().with_log_level("verbose");
        let payload = config.cardinal_configuration();

        assert_eq!(payload.logging.unwrap().level, "verbose");
        assert_eq!(payload.payment.unwrap().view.as_deref(), Some("modal"));
    }

    #[test]
    fn test_from_env() {
        env::set_var("CARDINAL_LOG_LEVEL", "on");
        env::set_var("CARDINAL_VALIDATION_TIMEOUT_SECS", "0");

        let config = CyberSourceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "on");
        assert_eq!(config.validation_timeout, None);

        env::set_var("CARDINAL_LOG_LEVEL", "loud");
        assert!(CyberSourceConfig::from_env().is_err());

        env::remove_var("CARDINAL_LOG_LEVEL");
        env::remove_var("CARDINAL_VALIDATION_TIMEOUT_SECS");
    }
}
