//! Read options and results handed to the view layer

use super::key::QueryKey;
use crate::error::ApiError;
use std::time::Duration;

/// How a read should be served
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub key: QueryKey,
    /// A disabled read never fetches
    pub enabled: bool,
    /// Overrides the client default freshness window
    pub freshness: Option<Duration>,
}

impl QueryOptions {
    pub fn new(key: QueryKey) -> Self {
        Self {
            key,
            enabled: true,
            freshness: None,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn freshness(mut self, freshness: Duration) -> Self {
        self.freshness = Some(freshness);
        self
    }
}

/// Lifecycle of a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Not yet available (a required input such as the identity is missing)
    Disabled,
    /// Nothing cached and nothing in flight
    Idle,
    /// A fetch is in flight
    Loading,
    Success,
    Error,
}

/// Outcome of a read
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    /// Fresh data on success; the last good value on a failed refresh
    pub data: Option<T>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<ApiError>,
    pub status: QueryStatus,
}

impl<T> QueryResult<T> {
    pub fn disabled() -> Self {
        Self::with_status(QueryStatus::Disabled, None, None)
    }

    pub fn idle() -> Self {
        Self::with_status(QueryStatus::Idle, None, None)
    }

    pub fn loading(data: Option<T>) -> Self {
        Self::with_status(QueryStatus::Loading, data, None)
    }

    pub fn success(data: T) -> Self {
        Self::with_status(QueryStatus::Success, Some(data), None)
    }

    /// A failure, optionally carrying the last known good value
    pub fn failure(error: ApiError, stale: Option<T>) -> Self {
        Self::with_status(QueryStatus::Error, stale, Some(error))
    }

    fn with_status(status: QueryStatus, data: Option<T>, error: Option<ApiError>) -> Self {
        Self {
            data,
            is_loading: status == QueryStatus::Loading,
            is_error: status == QueryStatus::Error,
            error,
            status,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.status == QueryStatus::Disabled
    }

    /// Convert to a plain result; disabled and idle reads yield `Ok(None)`
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryResult<U> {
        QueryResult {
            data: self.data.map(f),
            is_loading: self.is_loading,
            is_error: self.is_error,
            error: self.error,
            status: self.status,
        }
    }
}
