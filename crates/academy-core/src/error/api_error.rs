//! Classified API client failures

use std::fmt;
use thiserror::Error;

/// Closed set of failure kinds produced by the API client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// HTTP 401, the session most likely expired
    Unauthorized,
    /// HTTP 403
    Forbidden,
    /// HTTP 404
    NotFound,
    /// HTTP 503 that survived every retry
    ServiceUnavailable,
    /// Any other 5xx status
    Server,
    /// A non-5xx status whose body carried a message
    Application,
    /// No response was received
    Network,
    /// The request exceeded its ceiling wait duration
    Timeout,
    /// None of the above
    Unknown,
}

impl ApiErrorKind {
    /// Stable identifier used in logs and notifications
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::ServiceUnavailable => "service_unavailable",
            Self::Server => "server_error",
            Self::Application => "application_error",
            Self::Network => "network_error",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown_error",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure from the API client.
///
/// Constructed exactly once per terminal outcome, either from a non-success
/// response or from a transport failure. Downstream code matches on
/// [`ApiError::kind`] and never inspects raw transport shapes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct ApiError {
    /// Failure kind
    pub kind: ApiErrorKind,
    /// Server supplied or transport message
    pub message: Option<String>,
    /// HTTP status when a response was received
    pub status: Option<u16>,
}

impl ApiError {
    /// Create an error of the given kind without message or status
    pub fn new(kind: ApiErrorKind) -> Self {
        Self {
            kind,
            message: None,
            status: None,
        }
    }

    /// Attach a message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the HTTP status code
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Error raised locally when an operation needs a signed-in identity
    pub fn login_required() -> Self {
        Self::new(ApiErrorKind::Unauthorized).with_message("Please login to continue")
    }

    /// Failure kind
    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// Whether the caller should send the user back to sign-in
    pub fn requires_login(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}
