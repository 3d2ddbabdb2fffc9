//! Backend API access
//!
//! [`ApiClient`] is the single point of contact with the backend. Every
//! request carries the current identity token when one exists, a backend
//! that advertises a cooldown with `503 + retryAfter` is retried
//! transparently, and every terminal failure is classified into an
//! [`crate::error::ApiError`] exactly once.

pub mod client;
mod request;
mod token;

pub use client::ApiClient;
pub use request::{RequestDescriptor, resource_path};
pub use token::TokenSource;

#[cfg(test)]
pub(crate) use token::MockTokenSource;
