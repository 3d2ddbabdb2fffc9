//! API client constructor and initialization logic

use super::types::ApiClient;
use crate::api::TokenSource;
use crate::config::ApiConfig;
use crate::error::{AcademyError, AcademyResult};
use crate::events::{SharedNotifier, SilentNotifier};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use tracing::debug;

impl ApiClient {
    /// Create a new API client.
    ///
    /// The client starts without a token source (every request is anonymous)
    /// and with a notifier that discards everything; use
    /// [`ApiClient::with_token_source`] and [`ApiClient::with_notifier`] to
    /// wire in the session store and the view layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: ApiConfig) -> AcademyResult<Self> {
        config.validate()?;
        let base_url = config.base_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                AcademyError::config(format!("Invalid header name '{}': {}", key, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                AcademyError::config(format!("Invalid value for header '{}': {}", key, e))
            })?;
            headers.insert(name, value);
        }

        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AcademyError::config(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            base_url = %base_url,
            request_timeout_secs = config.request_timeout.as_secs(),
            max_retries = config.max_retries,
            "created API client"
        );

        Ok(Self {
            http,
            base_url,
            config,
            tokens: None,
            notifier: Arc::new(SilentNotifier),
        })
    }

    /// Attach the source of identity tokens
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Route notifications to the given sink
    pub fn with_notifier(mut self, notifier: SharedNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Client configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Base URL request paths are resolved against
    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }
}
