//! Cache keys and invalidation filters

use std::fmt;

/// Identity of a cached read: an operation name plus ordered parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    operation: String,
    params: Vec<String>,
}

impl QueryKey {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter value
    pub fn with_param(mut self, value: impl fmt::Display) -> Self {
        self.params.push(value.to_string());
        self
    }

    /// Append an optional parameter; `None` keys the same as an empty value
    pub fn with_optional_param(mut self, value: Option<&str>) -> Self {
        self.params.push(value.unwrap_or_default().to_string());
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.operation)
        } else {
            write!(f, "{}({})", self.operation, self.params.join(", "))
        }
    }
}

/// Selects cache entries by operation name and a parameter prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    operation: String,
    params: Vec<String>,
}

impl QueryFilter {
    /// Match every entry of an operation
    pub fn operation(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            params: Vec::new(),
        }
    }

    /// Narrow the match to entries whose next parameter equals `value`
    pub fn with_param(mut self, value: impl fmt::Display) -> Self {
        self.params.push(value.to_string());
        self
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        key.operation == self.operation && key.params.starts_with(&self.params)
    }
}

impl From<&QueryKey> for QueryFilter {
    fn from(key: &QueryKey) -> Self {
        Self {
            operation: key.operation.clone(),
            params: key.params.clone(),
        }
    }
}

impl From<QueryKey> for QueryFilter {
    fn from(key: QueryKey) -> Self {
        Self {
            operation: key.operation,
            params: key.params,
        }
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}(*)", self.operation)
        } else {
            write!(f, "{}({}, *)", self.operation, self.params.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_with_same_params_are_equal() {
        let a = QueryKey::new("courses").with_param("design").with_optional_param(None);
        let b = QueryKey::new("courses").with_param("design").with_param("");
        assert_eq!(a, b);
        assert_ne!(a, QueryKey::new("courses").with_param("data").with_param(""));
    }

    #[test]
    fn test_filter_prefix_matching() {
        let status = QueryKey::new("enrollment-status").with_param("c1").with_param("u1");

        assert!(QueryFilter::operation("enrollment-status").matches(&status));
        assert!(QueryFilter::operation("enrollment-status").with_param("c1").matches(&status));
        assert!(!QueryFilter::operation("enrollment-status").with_param("c2").matches(&status));
        assert!(!QueryFilter::operation("course").matches(&status));
        assert!(QueryFilter::from(&status).matches(&status));
    }

    #[test]
    fn test_display() {
        let key = QueryKey::new("course").with_param("c1");
        assert_eq!(key.to_string(), "course(c1)");
        assert_eq!(QueryKey::new("my-courses").to_string(), "my-courses");
        assert_eq!(QueryFilter::operation("courses").to_string(), "courses(*)");
    }
}
