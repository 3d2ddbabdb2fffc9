//! Identity toolkit wire types

use crate::auth::codes::provider_codes;
use crate::auth::identity::Identity;
use crate::auth::provider::ProviderError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateProfileRequest<'a> {
    pub id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<&'a str>,
    pub return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OobCodeRequest<'a> {
    pub request_type: &'static str,
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshRequest<'a> {
    pub grant_type: &'static str,
    pub refresh_token: &'a str,
}

/// Response of signInWithPassword, signUp and update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// signInWithPassword reports the photo here
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds, encoded as a string
    #[serde(default)]
    pub expires_in: Option<String>,
}

impl AccountResponse {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.local_id.clone(),
            display_name: self.display_name.clone().filter(|n| !n.is_empty()),
            email: self.email.clone(),
            photo_url: self
                .photo_url
                .clone()
                .or_else(|| self.profile_picture.clone())
                .filter(|p| !p.is_empty()),
        }
    }
}

/// Response of the secure token endpoint
#[derive(Debug, Deserialize)]
pub(super) struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDetail {
    #[serde(default)]
    pub message: String,
}

/// Map a backend error string such as `WEAK_PASSWORD : Password should be at
/// least 6 characters` onto a provider code.
pub(super) fn backend_error(message: &str) -> ProviderError {
    let (reason, detail) = match message.split_once(" : ") {
        Some((reason, detail)) => (reason.trim(), detail.trim()),
        None => (message.trim(), message.trim()),
    };

    let code = match reason {
        "EMAIL_NOT_FOUND" => provider_codes::USER_NOT_FOUND,
        "INVALID_PASSWORD" => provider_codes::WRONG_PASSWORD,
        "INVALID_LOGIN_CREDENTIALS" => provider_codes::INVALID_LOGIN_CREDENTIALS,
        "USER_DISABLED" => provider_codes::USER_DISABLED,
        "EMAIL_EXISTS" => provider_codes::EMAIL_ALREADY_IN_USE,
        "WEAK_PASSWORD" => provider_codes::WEAK_PASSWORD,
        "INVALID_EMAIL" | "MISSING_EMAIL" => provider_codes::INVALID_EMAIL,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => provider_codes::TOO_MANY_REQUESTS,
        "OPERATION_NOT_ALLOWED" => provider_codes::OPERATION_NOT_ALLOWED,
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" | "INVALID_ID_TOKEN" => {
            provider_codes::USER_TOKEN_EXPIRED
        }
        _ => provider_codes::INTERNAL_ERROR,
    };
    ProviderError::new(code, detail)
}

/// Parse expiry seconds, treating garbage as "already expired"
pub(super) fn expires_in_secs(value: Option<&str>) -> i64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// Absolute expiry of a token issued at `now`; out of range lifetimes count as expired
pub(super) fn expires_at(expires_in: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    TimeDelta::try_seconds(expires_in_secs(expires_in))
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(now)
}
