//! Retry logic for a backend that is warming up

use super::dispatch::AttemptOutcome;
use super::types::ApiClient;
use crate::api::RequestDescriptor;
use crate::error::ApiError;
use crate::events::{Notification, RETRY_NOTIFICATION_ID};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

impl ApiClient {
    /// Execute a request with the bounded retry policy.
    ///
    /// # Retry Strategy
    ///
    /// - Trigger: status `503` whose body carries a positive `retryAfter`
    /// - Delay: the advertised `retryAfter` seconds, capped at
    ///   `max_retry_delay`; fixed, not exponential
    /// - Bound: `max_retries` retries after the original attempt (default 3,
    ///   so at most 4 attempts)
    ///
    /// A progress notification is updated on every retry and dismissed once
    /// the request settles. A terminal failure is classified and notified
    /// exactly once, after the loop.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the last attempt.
    #[instrument(
        skip(self, request),
        fields(method = %request.method(), path = %request.path(), max_retries = self.config.max_retries)
    )]
    pub async fn execute(&self, mut request: RequestDescriptor) -> Result<Vec<u8>, ApiError> {
        loop {
            match self.dispatch(&request).await {
                AttemptOutcome::Success(body) => {
                    if request.retry_count() > 0 {
                        info!(retries = request.retry_count(), "request succeeded after retry");
                        self.notifier.notify(Notification::dismiss(RETRY_NOTIFICATION_ID));
                    }
                    return Ok(body);
                }
                AttemptOutcome::Failed {
                    error,
                    retry_after: Some(cooldown),
                } if request.retry_count() < self.config.max_retries => {
                    let attempt = request.record_retry();
                    let delay = cooldown.min(self.config.max_retry_delay);
                    warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_secs = delay.as_secs_f64(),
                        error = %error,
                        "backend unavailable, retrying"
                    );
                    self.notifier.notify(Notification::progress(
                        RETRY_NOTIFICATION_ID,
                        format!(
                            "Database connecting... Retrying ({}/{})",
                            attempt, self.config.max_retries
                        ),
                    ));
                    sleep(delay).await;
                }
                AttemptOutcome::Failed { error, .. } => {
                    return Err(self.report_failure(&request, error));
                }
            }
        }
    }

    /// Log and notify a terminal failure, handing the error back
    pub(super) fn report_failure(&self, request: &RequestDescriptor, failure: ApiError) -> ApiError {
        if request.retry_count() > 0 {
            self.notifier.notify(Notification::dismiss(RETRY_NOTIFICATION_ID));
        }
        error!(
            method = %request.method(),
            path = %request.path(),
            kind = %failure.kind,
            status = failure.status,
            retries = request.retry_count(),
            "request failed"
        );
        self.notifier
            .notify(Notification::api_error(failure.kind, failure.user_message()));
        failure
    }
}
