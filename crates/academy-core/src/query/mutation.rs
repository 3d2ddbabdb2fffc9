//! Writes that invalidate cached reads

use super::client::QueryClient;
use super::key::QueryFilter;
use crate::error::ApiError;
use std::future::Future;
use tracing::debug;

/// Handed to a mutation's success callback to declare stale reads
pub struct Invalidator<'a> {
    client: &'a QueryClient,
    filters: Vec<QueryFilter>,
}

impl<'a> Invalidator<'a> {
    fn new(client: &'a QueryClient) -> Self {
        Self {
            client,
            filters: Vec::new(),
        }
    }

    /// Remove every cached read the filter matches
    pub fn invalidate(&mut self, filter: impl Into<QueryFilter>) -> &mut Self {
        let filter = filter.into();
        self.client.invalidate(&filter);
        self.filters.push(filter);
        self
    }

    /// Filters applied so far
    pub fn filters(&self) -> &[QueryFilter] {
        &self.filters
    }
}

impl QueryClient {
    /// Run a write and, only if it succeeds, let `on_success` invalidate the
    /// reads it made stale. Mutations never touch the cache otherwise.
    pub async fn mutate<T, Fut, S>(&self, fetch: Fut, on_success: S) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
        S: FnOnce(&T, &mut Invalidator<'_>),
    {
        let value = fetch.await?;
        let mut invalidator = Invalidator::new(self);
        on_success(&value, &mut invalidator);
        debug!(invalidated = invalidator.filters.len(), "mutation succeeded");
        Ok(value)
    }
}
