//! Centralized timeout configuration
//!
//! Default values for network, cache and identity operations. All of them
//! can be overridden through [`super::AppConfig`].

use std::time::Duration;

/// Defaults for backend API requests
pub mod api {
    use super::*;

    /// Request ceiling (30 seconds), long enough for a cold-starting backend
    pub const REQUEST_SECS: u64 = 30;

    /// Connection establishment timeout (10 seconds)
    pub const CONNECT_SECS: u64 = 10;

    /// Upper bound on a server advertised retry cooldown (60 seconds)
    pub const MAX_RETRY_DELAY_SECS: u64 = 60;

    /// Retries after the original attempt for a warming-up backend
    pub const MAX_RETRIES: u32 = 3;

    /// Get request timeout as Duration
    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_SECS)
    }

    /// Get connection timeout as Duration
    pub fn connect_timeout() -> Duration {
        Duration::from_secs(CONNECT_SECS)
    }

    /// Get retry delay cap as Duration
    pub fn max_retry_delay() -> Duration {
        Duration::from_secs(MAX_RETRY_DELAY_SECS)
    }
}

/// Defaults for the query cache
pub mod query {
    use super::*;

    /// Default freshness window (5 minutes)
    pub const DEFAULT_FRESHNESS_SECS: u64 = 300;

    /// Freshness window for enrollment status reads (2 minutes)
    pub const ENROLLMENT_STATUS_FRESHNESS_SECS: u64 = 120;

    /// Get default freshness as Duration
    pub fn default_freshness() -> Duration {
        Duration::from_secs(DEFAULT_FRESHNESS_SECS)
    }

    /// Get enrollment status freshness as Duration
    pub fn enrollment_status_freshness() -> Duration {
        Duration::from_secs(ENROLLMENT_STATUS_FRESHNESS_SECS)
    }
}

/// Defaults for identity provider calls
pub mod identity {
    use super::*;

    /// Identity provider request timeout (15 seconds)
    pub const REQUEST_SECS: u64 = 15;

    /// Refresh tokens this long before they expire (60 seconds)
    pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

    /// Get identity request timeout as Duration
    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_timeouts() {
        assert_eq!(api::REQUEST_SECS, 30);
        assert_eq!(api::MAX_RETRIES, 3);
        assert!(api::connect_timeout() < api::request_timeout());
    }

    #[test]
    fn test_query_freshness() {
        assert_eq!(query::default_freshness(), Duration::from_secs(300));
        assert!(query::enrollment_status_freshness() < query::default_freshness());
    }
}
