//! Identity token seam between the API client and the session store

use crate::error::AuthError;
use async_trait::async_trait;

/// Anything able to hand out the current identity token
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// The token for the signed-in identity, or `None` when nobody is signed in.
    ///
    /// Failures are reported to the caller, which decides whether they are
    /// fatal; the API client treats them as "no token".
    async fn current_token(&self) -> Result<Option<String>, AuthError>;
}
