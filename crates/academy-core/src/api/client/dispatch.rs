//! A single request attempt

use super::types::ApiClient;
use crate::api::RequestDescriptor;
use crate::api::request::REQUEST_ID_HEADER;
use crate::error::{ApiError, ApiErrorKind, ErrorBody, classify_status, classify_transport};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Result of one attempt
pub(super) enum AttemptOutcome {
    Success(Vec<u8>),
    Failed {
        error: ApiError,
        /// Present only for a `503` carrying a usable `retryAfter`
        retry_after: Option<Duration>,
    },
}

impl ApiClient {
    /// Issue one attempt of `request`, attaching a freshly fetched token.
    pub(super) async fn dispatch(&self, request: &RequestDescriptor) -> AttemptOutcome {
        let url = match self.resolve(request.path()) {
            Ok(url) => url,
            Err(error) => {
                return AttemptOutcome::Failed {
                    error,
                    retry_after: None,
                };
            }
        };

        let mut builder = self.http.request(request.method.clone(), url.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = builder.header(REQUEST_ID_HEADER, request.request_id().to_string());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = self.bearer_token().await {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(
            method = %request.method,
            url = %url,
            request_id = %request.request_id(),
            retry = request.retry_count(),
            "dispatching request"
        );

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                return AttemptOutcome::Failed {
                    error: classify_transport(&e),
                    retry_after: None,
                };
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(e) => {
                return AttemptOutcome::Failed {
                    error: classify_transport(&e),
                    retry_after: None,
                };
            }
        };

        if status.is_success() {
            return AttemptOutcome::Success(body);
        }

        let parsed = ErrorBody::parse(&body);
        let retry_after = if status == StatusCode::SERVICE_UNAVAILABLE {
            parsed.retry_after()
        } else {
            None
        };
        AttemptOutcome::Failed {
            error: classify_status(status.as_u16(), &parsed),
            retry_after,
        }
    }

    /// Current token, or `None` when anonymous or when the lookup fails
    async fn bearer_token(&self) -> Option<String> {
        let tokens = self.tokens.as_ref()?;
        match tokens.current_token().await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(error) => {
                warn!(error = %error, "failed to get identity token, sending request without it");
                None
            }
        }
    }

    /// Resolve a request path against the base URL
    pub(super) fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| {
                ApiError::new(ApiErrorKind::Unknown)
                    .with_message(format!("Invalid request path '{}': {}", path, e))
            })
    }
}
