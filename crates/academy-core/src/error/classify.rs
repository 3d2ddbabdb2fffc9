//! Transport boundary normalisation
//!
//! Raw responses and transport failures are turned into [`ApiError`] here and
//! nowhere else.

use super::{ApiError, ApiErrorKind};
use std::time::Duration;

/// The fields the backend may put in an error body
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub retry_after: Option<f64>,
}

impl ErrorBody {
    /// Parse an error body leniently; anything unexpected yields empty fields
    pub fn parse(bytes: &[u8]) -> Self {
        let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) else {
            return Self::default();
        };
        Self {
            message: value
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            retry_after: value.get("retryAfter").and_then(|r| r.as_f64()),
        }
    }

    /// The advertised cooldown, only when it is a positive number of seconds.
    ///
    /// Values too large for a `Duration` saturate; the client caps the wait.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }
}

/// Classify a non-success HTTP status
pub(crate) fn classify_status(status: u16, body: &ErrorBody) -> ApiError {
    let kind = match status {
        401 => ApiErrorKind::Unauthorized,
        403 => ApiErrorKind::Forbidden,
        404 => ApiErrorKind::NotFound,
        503 => ApiErrorKind::ServiceUnavailable,
        500..=599 => ApiErrorKind::Server,
        _ if body.message.is_some() => ApiErrorKind::Application,
        _ => ApiErrorKind::Unknown,
    };

    let error = ApiError::new(kind).with_status(status);
    match &body.message {
        Some(message) => error.with_message(message.clone()),
        None => error,
    }
}

/// Classify a failure where no usable response was received
pub(crate) fn classify_transport(error: &reqwest::Error) -> ApiError {
    let kind = if error.is_timeout() {
        ApiErrorKind::Timeout
    } else if error.is_decode() || error.is_builder() {
        ApiErrorKind::Unknown
    } else {
        ApiErrorKind::Network
    };
    ApiError::new(kind).with_message(error.to_string())
}
