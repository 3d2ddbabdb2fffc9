//! Error types for the academy client
//!
//! Two closed taxonomies flow through the crate:
//! - [`ApiError`]: produced once at the transport boundary by the API client
//! - [`AuthError`]: produced by the session store from identity provider codes
//!
//! [`AcademyError`] wraps both together with configuration and storage
//! failures for callers that only want one error type.

mod api_error;
mod auth_error;
mod classify;
mod types;
mod user_messages;

pub use api_error::{ApiError, ApiErrorKind};
pub use auth_error::{AuthError, AuthErrorKind};
pub(crate) use classify::{ErrorBody, classify_status, classify_transport};
pub use types::{AcademyError, AcademyResult};
