//! Session store failures

use std::fmt;
use thiserror::Error;

/// Closed set of failure kinds produced by the session store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    AccountNotFound,
    InvalidCredentials,
    EmailAlreadyRegistered,
    WeakCredentials,
    InvalidEmail,
    RateLimited,
    AccountDisabled,
    PopupCancelled,
    ProviderAccountConflict,
    Unknown,
}

impl AuthErrorKind {
    /// Stable identifier used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountNotFound => "account_not_found",
            Self::InvalidCredentials => "invalid_credentials",
            Self::EmailAlreadyRegistered => "email_already_registered",
            Self::WeakCredentials => "weak_credentials",
            Self::InvalidEmail => "invalid_email",
            Self::RateLimited => "rate_limited",
            Self::AccountDisabled => "account_disabled",
            Self::PopupCancelled => "popup_cancelled",
            Self::ProviderAccountConflict => "provider_account_conflict",
            Self::Unknown => "unknown_auth_error",
        }
    }
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A translated identity provider failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct AuthError {
    /// Failure kind
    pub kind: AuthErrorKind,
    /// Provider message, if any
    pub message: Option<String>,
    /// Original provider code, kept for diagnostics only
    pub provider_code: Option<String>,
}

impl AuthError {
    /// Create an error of the given kind
    pub fn new(kind: AuthErrorKind) -> Self {
        Self {
            kind,
            message: None,
            provider_code: None,
        }
    }

    /// Attach a message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the originating provider code
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Failure kind
    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    /// The user dismissed an interactive sign-in; views usually stay silent
    pub fn is_cancellation(&self) -> bool {
        self.kind == AuthErrorKind::PopupCancelled
    }
}
