//! Outgoing request descriptor

use reqwest::Method;
use serde::Serialize;
use uuid::Uuid;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Join a collection path and one resource id, percent-encoding the id so
/// it always stays a single path segment
pub fn resource_path(collection: &str, id: &str) -> String {
    let segment = match id {
        "." => "%2E".into(),
        ".." => "%2E%2E".into(),
        _ => urlencoding::encode(id),
    };
    format!("{}/{}", collection.trim_end_matches('/'), segment)
}

/// Everything needed to (re)issue one logical request.
///
/// The retry counter lives on the descriptor itself, so two requests being
/// retried at the same time never share state.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<serde_json::Value>,
    pub(crate) headers: Vec<(String, String)>,
    /// Shared by every attempt of this request
    request_id: Uuid,
    retry_count: u32,
}

impl RequestDescriptor {
    /// Create a descriptor for the given method and path
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            request_id: Uuid::new_v4(),
            retry_count: 0,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append every parameter whose value is non-empty
    pub fn with_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            let value = value.into();
            if !value.is_empty() {
                self.query.push((name.into(), value));
            }
        }
        self
    }

    /// Set a JSON body
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> serde_json::Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Add a header for this request only
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of retries already performed for this request
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Record one more retry and return the new count
    pub(crate) fn record_retry(&mut self) -> u32 {
        self.retry_count += 1;
        self.retry_count
    }
}
