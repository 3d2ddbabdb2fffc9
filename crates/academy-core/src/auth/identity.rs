//! Identity and session state values

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A signed-in user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Provider assigned user id
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Profile photo reference (usually a URL)
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl Identity {
    /// Create an identity with only an id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: None,
            photo_url: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }

    /// Name to show in the UI, falling back to the email
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Input for credential registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: None,
            photo_url: None,
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into()).filter(|n: &String| !n.is_empty());
        self
    }

    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into()).filter(|p: &String| !p.is_empty());
        self
    }
}

/// Who is signed in.
///
/// The value is replaced wholesale on every transition, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The provider has not reported yet
    #[default]
    Unknown,
    /// Nobody is signed in
    Anonymous,
    /// A user is signed in
    Authenticated(Arc<Identity>),
}

impl SessionState {
    /// Build the state a provider report maps to
    pub fn from_report(identity: Option<Identity>) -> Self {
        match identity {
            Some(identity) => Self::Authenticated(Arc::new(identity)),
            None => Self::Anonymous,
        }
    }

    pub fn identity(&self) -> Option<&Arc<Identity>> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}
