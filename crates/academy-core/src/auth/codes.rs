//! Provider code translation
//!
//! The rest of the crate never looks at provider codes; they are mapped to
//! [`AuthErrorKind`] here.

use super::provider::ProviderError;
use crate::error::{AuthError, AuthErrorKind};

/// Stable provider codes
pub mod provider_codes {
    pub const USER_NOT_FOUND: &str = "auth/user-not-found";
    pub const WRONG_PASSWORD: &str = "auth/wrong-password";
    pub const INVALID_CREDENTIAL: &str = "auth/invalid-credential";
    pub const INVALID_LOGIN_CREDENTIALS: &str = "auth/invalid-login-credentials";
    pub const EMAIL_ALREADY_IN_USE: &str = "auth/email-already-in-use";
    pub const WEAK_PASSWORD: &str = "auth/weak-password";
    pub const INVALID_EMAIL: &str = "auth/invalid-email";
    pub const MISSING_EMAIL: &str = "auth/missing-email";
    pub const TOO_MANY_REQUESTS: &str = "auth/too-many-requests";
    pub const USER_DISABLED: &str = "auth/user-disabled";
    pub const POPUP_CLOSED_BY_USER: &str = "auth/popup-closed-by-user";
    pub const CANCELLED_POPUP_REQUEST: &str = "auth/cancelled-popup-request";
    pub const ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL: &str =
        "auth/account-exists-with-different-credential";
    pub const USER_TOKEN_EXPIRED: &str = "auth/user-token-expired";
    pub const NETWORK_REQUEST_FAILED: &str = "auth/network-request-failed";
    pub const OPERATION_NOT_ALLOWED: &str = "auth/operation-not-allowed";
    pub const OPERATION_NOT_SUPPORTED: &str = "auth/operation-not-supported-in-this-environment";
    pub const INTERNAL_ERROR: &str = "auth/internal-error";
}

/// Map a provider failure onto the session store taxonomy
pub fn translate_provider_error(error: &ProviderError) -> AuthError {
    use provider_codes::*;

    let kind = match error.code.as_str() {
        USER_NOT_FOUND => AuthErrorKind::AccountNotFound,
        WRONG_PASSWORD | INVALID_CREDENTIAL | INVALID_LOGIN_CREDENTIALS => {
            AuthErrorKind::InvalidCredentials
        }
        EMAIL_ALREADY_IN_USE => AuthErrorKind::EmailAlreadyRegistered,
        WEAK_PASSWORD => AuthErrorKind::WeakCredentials,
        INVALID_EMAIL | MISSING_EMAIL => AuthErrorKind::InvalidEmail,
        TOO_MANY_REQUESTS => AuthErrorKind::RateLimited,
        USER_DISABLED => AuthErrorKind::AccountDisabled,
        POPUP_CLOSED_BY_USER | CANCELLED_POPUP_REQUEST => AuthErrorKind::PopupCancelled,
        ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL => AuthErrorKind::ProviderAccountConflict,
        _ => AuthErrorKind::Unknown,
    };

    AuthError::new(kind)
        .with_message(error.message.clone())
        .with_provider_code(error.code.clone())
}

#[cfg(test)]
mod tests {
    use super::provider_codes::*;
    use super::*;

    fn kind_of(code: &str) -> AuthErrorKind {
        translate_provider_error(&ProviderError::new(code, "message")).kind
    }

    #[test]
    fn test_translation_table() {
        assert_eq!(kind_of(USER_NOT_FOUND), AuthErrorKind::AccountNotFound);
        assert_eq!(kind_of(WRONG_PASSWORD), AuthErrorKind::InvalidCredentials);
        assert_eq!(kind_of(INVALID_CREDENTIAL), AuthErrorKind::InvalidCredentials);
        assert_eq!(kind_of(EMAIL_ALREADY_IN_USE), AuthErrorKind::EmailAlreadyRegistered);
        assert_eq!(kind_of(WEAK_PASSWORD), AuthErrorKind::WeakCredentials);
        assert_eq!(kind_of(INVALID_EMAIL), AuthErrorKind::InvalidEmail);
        assert_eq!(kind_of(TOO_MANY_REQUESTS), AuthErrorKind::RateLimited);
        assert_eq!(kind_of(USER_DISABLED), AuthErrorKind::AccountDisabled);
        assert_eq!(kind_of(POPUP_CLOSED_BY_USER), AuthErrorKind::PopupCancelled);
        assert_eq!(
            kind_of(ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL),
            AuthErrorKind::ProviderAccountConflict
        );
        assert_eq!(kind_of("auth/something-new"), AuthErrorKind::Unknown);
    }

    #[test]
    fn test_translation_keeps_provider_details() {
        let error = translate_provider_error(&ProviderError::new(WEAK_PASSWORD, "too short"));
        assert_eq!(error.provider_code.as_deref(), Some(WEAK_PASSWORD));
        assert_eq!(error.message.as_deref(), Some("too short"));
    }
}
