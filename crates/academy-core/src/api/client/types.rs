//! API client type definitions

use crate::api::TokenSource;
use crate::config::ApiConfig;
use crate::events::SharedNotifier;
use reqwest::Client;
use std::sync::Arc;
use url::Url;

/// HTTP client for the academy backend.
///
/// # Features
///
/// - **Token injection**: a fresh token from the [`TokenSource`] is attached
///   to every attempt; token failures degrade to an unauthenticated request
/// - **Bounded retry**: `503` with a positive `retryAfter` is retried up to
///   `max_retries` times, waiting the advertised cooldown each time
/// - **Error normalisation**: every terminal failure becomes one
///   [`crate::error::ApiError`] and one notification
///
/// Dropping a pending call cancels it, including any retry wait in progress.
///
/// # Examples
///
/// ```no_run
/// use academy_core::api::ApiClient;
/// use academy_core::config::ApiConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(ApiConfig::new("http://localhost:5000/api"))?;
/// let course: serde_json::Value = client.get("/courses/42", &[]).await?;
/// println!("{}", course["title"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    pub(super) http: Client,
    pub(super) base_url: Url,
    pub(super) config: ApiConfig,
    pub(super) tokens: Option<Arc<dyn TokenSource>>,
    pub(super) notifier: SharedNotifier,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("max_retries", &self.config.max_retries)
            .field("authenticated", &self.tokens.is_some())
            .finish()
    }
}
