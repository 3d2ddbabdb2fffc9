//! Human readable notification text for each error kind

use super::{ApiError, ApiErrorKind, AuthError, AuthErrorKind};

impl ApiError {
    /// Message shown to the user for this failure
    pub fn user_message(&self) -> String {
        match self.kind {
            ApiErrorKind::Unauthorized => "Session expired. Please login again.".to_string(),
            ApiErrorKind::Forbidden => {
                "You do not have permission to perform this action.".to_string()
            }
            ApiErrorKind::NotFound => "Resource not found.".to_string(),
            ApiErrorKind::ServiceUnavailable => self.message.clone().unwrap_or_else(|| {
                "Database connection failed. Please refresh the page and try again.".to_string()
            }),
            ApiErrorKind::Server => "Server error. Please try again later.".to_string(),
            ApiErrorKind::Application => self
                .message
                .clone()
                .unwrap_or_else(|| "The request could not be completed.".to_string()),
            ApiErrorKind::Timeout => {
                "Request timeout. Database might be connecting. Please try again in a moment."
                    .to_string()
            }
            ApiErrorKind::Network => "Network error. Please check your connection.".to_string(),
            ApiErrorKind::Unknown => "An unexpected error occurred.".to_string(),
        }
    }
}

impl AuthError {
    /// Message shown to the user for this failure
    pub fn user_message(&self) -> String {
        let text = match self.kind {
            AuthErrorKind::AccountNotFound => "No account found with this email.",
            AuthErrorKind::InvalidCredentials => "Incorrect email or password.",
            AuthErrorKind::EmailAlreadyRegistered => {
                "This email is already registered. Please login instead."
            }
            AuthErrorKind::WeakCredentials => {
                "Password is too weak. Please use a stronger password."
            }
            AuthErrorKind::InvalidEmail => "Please enter a valid email address.",
            AuthErrorKind::RateLimited => "Too many attempts. Please try again later.",
            AuthErrorKind::AccountDisabled => "This account has been disabled.",
            AuthErrorKind::PopupCancelled => "Sign-in was cancelled.",
            AuthErrorKind::ProviderAccountConflict => {
                "This email is registered with password. Please login with your password instead."
            }
            AuthErrorKind::Unknown => {
                return self
                    .message
                    .clone()
                    .unwrap_or_else(|| "Authentication failed. Please try again.".to_string());
            }
        };
        text.to_string()
    }
}
