//! Application state shared across all relay handlers.

use std::sync::Arc;

use url::Url;

use crate::config::RelayConfig;

/// Shared relay state: the downstream target and a pooled HTTP client.
pub struct AppState {
    /// HTTP client used for the downstream call.
    pub client: reqwest::Client,
    /// Downstream Rasa webhook.
    pub webhook_url: Url,
}

impl AppState {
    /// Create the relay state from configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &RelayConfig) -> Result<Arc<Self>, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Arc::new(Self {
            client,
            webhook_url: config.webhook_url.clone(),
        }))
    }

    /// Create the relay state around an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, webhook_url: Url) -> Arc<Self> {
        Arc::new(Self {
            client,
            webhook_url,
        })
    }
}
