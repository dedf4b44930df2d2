//! # Cardinal Script Loader
//!
//! Picks the Songbird endpoint for the environment, loads it through the
//! page's script host and returns the session handle the script exposes.

use crate::session::SessionHandle;
use async_trait::async_trait;
use pay_core::{PaymentError, PaymentResult};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Songbird staging endpoint
pub const TEST_SCRIPT_URL: &str = "https://songbirdstag.cardinalcommerce.com/edge/v1/songbird.js";

/// Songbird production endpoint
pub const PRODUCTION_SCRIPT_URL: &str = "https://songbird.cardinalcommerce.com/edge/v1/songbird.js";

/// Endpoint for the given mode
pub fn script_url(test_mode: bool) -> &'static str {
    if test_mode {
        TEST_SCRIPT_URL
    } else {
        PRODUCTION_SCRIPT_URL
    }
}

/// Page-side script loading
#[async_trait]
pub trait CardinalScriptHost: Send + Sync {
    /// Load a script tag and resolve once it has executed
    async fn load_script(&self, url: &str) -> PaymentResult<()>;

    /// The session object the Cardinal script installed, if any
    fn cardinal(&self) -> Option<SessionHandle>;
}

/// Loader for the CyberSource/Cardinal script
#[derive(Clone)]
pub struct CyberSourceScriptLoader {
    host: Arc<dyn CardinalScriptHost>,
}

impl CyberSourceScriptLoader {
    pub fn new(host: Arc<dyn CardinalScriptHost>) -> Self {
        Self { host }
    }

    /// Load the script for `test_mode` and return its session
    #[instrument(skip(self))]
    pub async fn load(&self, test_mode: bool) -> PaymentResult<SessionHandle> {
        let url = script_url(test_mode);
        debug!(url, "Loading Cardinal script");

        self.host.load_script(url).await?;

        self.host.cardinal().ok_or_else(|| PaymentError::ProviderError {
            provider: "cybersource".to_string(),
            message: format!("Cardinal session unavailable after loading {}", url),
        })
    }
}
