//! Query cache coordination
//!
//! [`QueryClient`] caches read results by [`QueryKey`], serves them while
//! fresh, coalesces concurrent reads of the same key into one fetch, and
//! lets mutations invalidate entries by [`QueryFilter`].

mod client;
mod key;
mod mutation;
mod state;

pub use client::QueryClient;
pub use key::{QueryFilter, QueryKey};
pub use mutation::Invalidator;
pub use state::{QueryOptions, QueryResult, QueryStatus};
