//! API client implementation
//!
//! Split the same way every concern is split elsewhere in the crate:
//! construction, a single dispatch attempt, the bounded retry loop and the
//! typed HTTP verbs.

mod constructor;
mod dispatch;
mod retry;
#[cfg(test)]
mod tests;
mod types;
mod verbs;

pub use types::ApiClient;
