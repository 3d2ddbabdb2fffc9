//! Configuration models

use super::timeouts;
use crate::error::{AcademyError, AcademyResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Default backend base URL
pub const DEFAULT_API_BASE_URL: &str = "https://taieba-academy-server.vercel.app/api";

/// Default identity toolkit endpoint
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

/// Default secure token endpoint
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1";

/// Backend API client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is joined onto
    pub base_url: String,
    /// Ceiling wait for a single attempt
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connection establishment timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Retries after the original attempt when the backend is warming up
    pub max_retries: u32,
    /// Cap applied to the server advertised cooldown
    #[serde(with = "humantime_serde")]
    pub max_retry_delay: Duration,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: timeouts::api::request_timeout(),
            connect_timeout: timeouts::api::connect_timeout(),
            max_retries: timeouts::api::MAX_RETRIES,
            max_retry_delay: timeouts::api::max_retry_delay(),
            headers: HashMap::new(),
        }
    }
}

impl ApiConfig {
    /// Create a config pointing at the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request ceiling
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the retry bound
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the retry delay cap
    pub fn with_max_retry_delay(mut self, delay: Duration) -> Self {
        self.max_retry_delay = delay;
        self
    }

    /// Add a default header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Parsed base URL, always ending in a slash so relative joins append
    pub fn base_url(&self) -> AcademyResult<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|e| {
            AcademyError::config_with_context(
                format!("Invalid API base URL: {}", e),
                format!("Parsing base URL '{}'", self.base_url),
            )
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(AcademyError::config(format!(
                "Unsupported API URL scheme '{}'",
                other
            ))),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> AcademyResult<()> {
        self.base_url()?;
        if self.request_timeout.is_zero() {
            return Err(AcademyError::config("Request timeout must be greater than zero"));
        }
        if self.connect_timeout.is_zero() {
            return Err(AcademyError::config("Connect timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Query cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Freshness window used when a read does not specify one
    #[serde(with = "humantime_serde")]
    pub default_freshness: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_freshness: timeouts::query::default_freshness(),
        }
    }
}

/// Identity provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    #[serde(default)]
    pub auth_domain: Option<String>,
    /// Identity toolkit base endpoint
    pub identity_endpoint: String,
    /// Secure token base endpoint
    pub token_endpoint: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl FirebaseConfig {
    /// Create a config for the given project
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            auth_domain: None,
            identity_endpoint: DEFAULT_IDENTITY_ENDPOINT.to_string(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            request_timeout: timeouts::identity::request_timeout(),
        }
    }

    /// Point both endpoints at another host (emulators and tests)
    pub fn with_endpoints(
        mut self,
        identity_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
    ) -> Self {
        self.identity_endpoint = identity_endpoint.into();
        self.token_endpoint = token_endpoint.into();
        self
    }

    /// Set the auth domain
    pub fn with_auth_domain(mut self, domain: impl Into<String>) -> Self {
        self.auth_domain = Some(domain.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> AcademyResult<()> {
        if self.api_key.trim().is_empty() || self.project_id.trim().is_empty() {
            return Err(AcademyError::config_with_context(
                "Firebase configuration is incomplete",
                "Set ACADEMY_FIREBASE_API_KEY and ACADEMY_FIREBASE_PROJECT_ID",
            ));
        }
        Ok(())
    }
}

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub query: QueryConfig,
    /// `None` when no identity provider is configured
    #[serde(default)]
    pub firebase: Option<FirebaseConfig>,
}

impl AppConfig {
    /// Validate every section
    pub fn validate(&self) -> AcademyResult<()> {
        self.api.validate()?;
        if let Some(firebase) = &self.firebase {
            firebase.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_config() {
        let config = ApiConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ApiConfig::new("http://localhost:5000/api");
        assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:5000/api/");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(ApiConfig::new("not a url").validate().is_err());
        assert!(ApiConfig::new("ftp://example.com").validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = ApiConfig::default().with_request_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_firebase_requires_key_and_project() {
        assert!(FirebaseConfig::new("", "proj").validate().is_err());
        assert!(FirebaseConfig::new("key", " ").validate().is_err());
        assert!(FirebaseConfig::new("key", "proj").validate().is_ok());
    }

    #[test]
    fn test_config_serializes_durations_as_text() {
        let json = serde_json::to_value(ApiConfig::default()).unwrap();
        assert_eq!(json["request_timeout"], "30s");
    }
}
