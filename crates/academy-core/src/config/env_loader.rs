//! Environment variable-based configuration loading

use super::model::{ApiConfig, AppConfig, FirebaseConfig, QueryConfig};
use crate::error::{AcademyError, AcademyResult};
use std::env;
use std::time::Duration;

/// Load configuration from `ACADEMY_*` environment variables.
///
/// A `.env` file in the working directory is read first when present.
pub fn load_from_env() -> AcademyResult<AppConfig> {
    if let Ok(path) = dotenv::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }
    load_from_lookup(|name| env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup
pub fn load_from_lookup<F>(lookup: F) -> AcademyResult<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut api = ApiConfig::default();
    if let Some(base_url) = lookup("ACADEMY_API_BASE_URL") {
        api.base_url = base_url;
    }
    if let Some(timeout) = parse_secs(&lookup, "ACADEMY_REQUEST_TIMEOUT_SECS")? {
        api.request_timeout = timeout;
    }
    if let Some(timeout) = parse_secs(&lookup, "ACADEMY_CONNECT_TIMEOUT_SECS")? {
        api.connect_timeout = timeout;
    }
    if let Some(delay) = parse_secs(&lookup, "ACADEMY_MAX_RETRY_DELAY_SECS")? {
        api.max_retry_delay = delay;
    }
    if let Some(raw) = lookup("ACADEMY_MAX_RETRIES") {
        api.max_retries = raw.trim().parse().map_err(|_| {
            AcademyError::config_with_context(
                "Invalid ACADEMY_MAX_RETRIES value",
                format!("Parsing retry count '{}'", raw),
            )
        })?;
    }

    let mut query = QueryConfig::default();
    if let Some(freshness) = parse_secs(&lookup, "ACADEMY_QUERY_FRESHNESS_SECS")? {
        query.default_freshness = freshness;
    }

    let firebase = match (
        lookup("ACADEMY_FIREBASE_API_KEY"),
        lookup("ACADEMY_FIREBASE_PROJECT_ID"),
    ) {
        (None, None) => None,
        (api_key, project_id) => {
            let mut firebase =
                FirebaseConfig::new(api_key.unwrap_or_default(), project_id.unwrap_or_default());
            if let Some(domain) = lookup("ACADEMY_FIREBASE_AUTH_DOMAIN") {
                firebase = firebase.with_auth_domain(domain);
            }
            Some(firebase)
        }
    };

    let config = AppConfig {
        api,
        query,
        firebase,
    };
    config.validate()?;
    Ok(config)
}

fn parse_secs<F>(lookup: &F, name: &str) -> AcademyResult<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let secs: u64 = raw.trim().parse().map_err(|_| {
        AcademyError::config_with_context(
            format!("Invalid {} value", name),
            format!("Parsing seconds value '{}'", raw),
        )
    })?;
    Ok(Some(Duration::from_secs(secs)))
}
