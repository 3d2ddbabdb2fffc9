//! Firebase identity toolkit adapter
//!
//! Talks to the identity toolkit REST API with an API key. The refresh
//! credential is persisted through [`SessionStorage`] so a later process
//! can restore the session.

mod dto;
#[cfg(test)]
mod tests;

use super::codes::provider_codes;
use super::identity::{Identity, Registration};
use super::provider::{
    AuthStateListener, AuthStateListeners, IdentityProvider, ProviderError, Subscription,
};
use super::storage::{SessionStorage, StoredSession};
use crate::config::{FirebaseConfig, timeouts};
use crate::error::{AcademyError, AcademyResult};
use async_trait::async_trait;
use chrono::Utc;
use dto::{
    AccountResponse, ErrorEnvelope, OobCodeRequest, PasswordRequest, RefreshRequest,
    RefreshResponse, UpdateProfileRequest,
};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Default)]
struct ProviderState {
    session: Option<StoredSession>,
    restored: bool,
}

/// Identity provider backed by the Firebase REST API
pub struct FirebaseIdentityProvider {
    http: reqwest::Client,
    config: FirebaseConfig,
    storage: Arc<dyn SessionStorage>,
    state: Mutex<ProviderState>,
    listeners: AuthStateListeners,
}

impl FirebaseIdentityProvider {
    /// Create a provider. Call [`Self::restore`] before relying on state reports.
    pub fn new(config: FirebaseConfig, storage: Arc<dyn SessionStorage>) -> AcademyResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AcademyError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            storage,
            state: Mutex::new(ProviderState::default()),
            listeners: AuthStateListeners::new(),
        })
    }

    /// Load the persisted session and report the resulting state.
    ///
    /// An expired token is refreshed. A refresh credential the backend
    /// rejects is discarded; a network failure keeps the stored session so
    /// the next token request can try again.
    pub async fn restore(&self) -> Option<Identity> {
        let stored = match self.storage.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to read stored session: {}", e);
                None
            }
        };

        let session = match stored {
            None => None,
            Some(stored) if stored.has_live_token(timeouts::identity::TOKEN_REFRESH_MARGIN_SECS) => {
                Some(stored)
            }
            Some(stored) => match self.refresh(&stored).await {
                Ok(refreshed) => Some(refreshed),
                Err(e) if e.code == provider_codes::USER_TOKEN_EXPIRED => {
                    info!("Stored session is no longer valid");
                    self.forget_stored();
                    None
                }
                Err(e) => {
                    warn!("Could not refresh stored session: {}", e);
                    Some(stored)
                }
            },
        };

        let identity = session.as_ref().map(|s| s.identity.clone());
        {
            let mut state = self.state.lock();
            state.session = session;
            state.restored = true;
        }
        if let Some(identity) = &identity {
            debug!(user = %identity.id, "Restored session");
        }
        self.listeners.emit(identity.as_ref());
        identity
    }

    fn account_url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{}",
            self.config.identity_endpoint.trim_end_matches('/'),
            method
        )
    }

    fn token_url(&self) -> String {
        format!("{}/token", self.config.token_endpoint.trim_end_matches('/'))
    }

    async fn post_json<B, R>(&self, url: String, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body);
        self.send(request).await
    }

    async fn send<R: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<R, ProviderError> {
        let response = request.send().await.map_err(|e| {
            ProviderError::new(provider_codes::NETWORK_REQUEST_FAILED, e.to_string())
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            ProviderError::new(provider_codes::NETWORK_REQUEST_FAILED, e.to_string())
        })?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ErrorEnvelope>(&body) {
                Ok(envelope) => dto::backend_error(&envelope.error.message),
                Err(_) => ProviderError::new(
                    provider_codes::INTERNAL_ERROR,
                    format!("Identity service returned {}", status),
                ),
            });
        }

        serde_json::from_slice(&body)
            .map_err(|e| ProviderError::new(provider_codes::INTERNAL_ERROR, e.to_string()))
    }

    async fn refresh(&self, stored: &StoredSession) -> Result<StoredSession, ProviderError> {
        debug!(user = %stored.identity.id, "Refreshing identity token");
        let request = self
            .http
            .post(self.token_url())
            .query(&[("key", self.config.api_key.as_str())])
            .form(&RefreshRequest {
                grant_type: "refresh_token",
                refresh_token: &stored.refresh_token,
            });
        let response: RefreshResponse = self.send(request).await?;

        if let Some(user_id) = &response.user_id {
            if *user_id != stored.identity.id {
                return Err(ProviderError::new(
                    provider_codes::USER_TOKEN_EXPIRED,
                    "Refreshed token belongs to another user",
                ));
            }
        }

        Ok(StoredSession {
            identity: stored.identity.clone(),
            refresh_token: response.refresh_token,
            id_token: Some(response.id_token),
            expires_at: Some(expiry(Some(&response.expires_in))),
        })
    }

    fn session_from(response: &AccountResponse) -> Result<StoredSession, ProviderError> {
        let refresh_token = response.refresh_token.clone().ok_or_else(|| {
            ProviderError::new(provider_codes::INTERNAL_ERROR, "Missing refresh token")
        })?;
        Ok(StoredSession {
            identity: response.identity(),
            refresh_token,
            id_token: response.id_token.clone(),
            expires_at: Some(expiry(response.expires_in.as_deref())),
        })
    }

    /// Make a session current, persist it and report it
    fn adopt(&self, session: StoredSession) -> Identity {
        if let Err(e) = self.storage.save(&session) {
            warn!("Failed to persist session: {}", e);
        }
        let identity = session.identity.clone();
        self.state.lock().session = Some(session);
        self.listeners.emit(Some(&identity));
        identity
    }

    fn forget_stored(&self) {
        if let Err(e) = self.storage.clear() {
            warn!("Failed to clear stored session: {}", e);
        }
    }

    fn current_session(&self) -> Option<StoredSession> {
        self.state.lock().session.clone()
    }
}

fn expiry(expires_in: Option<&str>) -> chrono::DateTime<Utc> {
    dto::expires_at(expires_in, Utc::now())
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, ProviderError> {
        let response: AccountResponse = self
            .post_json(
                self.account_url("signInWithPassword"),
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(self.adopt(Self::session_from(&response)?))
    }

    async fn create_account(&self, registration: &Registration) -> Result<Identity, ProviderError> {
        let response: AccountResponse = self
            .post_json(
                self.account_url("signUp"),
                &PasswordRequest {
                    email: &registration.email,
                    password: &registration.password,
                    return_secure_token: true,
                },
            )
            .await?;
        let mut session = Self::session_from(&response)?;

        if registration.name.is_some() || registration.photo_url.is_some() {
            let id_token = session.id_token.clone().unwrap_or_default();
            let updated: AccountResponse = self
                .post_json(
                    self.account_url("update"),
                    &UpdateProfileRequest {
                        id_token: &id_token,
                        display_name: registration.name.as_deref(),
                        photo_url: registration.photo_url.as_deref(),
                        return_secure_token: true,
                    },
                )
                .await?;

            let profile = updated.identity();
            session.identity.display_name = profile.display_name.or(registration.name.clone());
            session.identity.photo_url = profile.photo_url.or(registration.photo_url.clone());
            if let (Some(id_token), Some(refresh_token)) = (updated.id_token, updated.refresh_token)
            {
                session.id_token = Some(id_token);
                session.refresh_token = refresh_token;
                session.expires_at = Some(expiry(updated.expires_in.as_deref()));
            }
        }

        Ok(self.adopt(session))
    }

    async fn sign_in_with_federated(&self) -> Result<Identity, ProviderError> {
        Err(ProviderError::new(
            provider_codes::OPERATION_NOT_SUPPORTED,
            "Federated sign-in needs a browser popup",
        ))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.storage
            .clear()
            .map_err(|e| ProviderError::new(provider_codes::INTERNAL_ERROR, e.to_string()))?;
        self.state.lock().session = None;
        self.listeners.emit(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let _: serde_json::Value = self
            .post_json(
                self.account_url("sendOobCode"),
                &OobCodeRequest {
                    request_type: "PASSWORD_RESET",
                    email,
                },
            )
            .await?;
        Ok(())
    }

    async fn id_token(&self) -> Result<Option<String>, ProviderError> {
        let Some(session) = self.current_session() else {
            return Ok(None);
        };
        if session.has_live_token(timeouts::identity::TOKEN_REFRESH_MARGIN_SECS) {
            return Ok(session.id_token);
        }

        match self.refresh(&session).await {
            Ok(refreshed) => {
                let token = refreshed.id_token.clone();
                if let Err(e) = self.storage.save(&refreshed) {
                    warn!("Failed to persist refreshed session: {}", e);
                }
                let mut state = self.state.lock();
                // Ignore the refresh if the user signed out meanwhile
                if state.session.as_ref().map(|s| &s.identity.id) == Some(&refreshed.identity.id) {
                    state.session = Some(refreshed);
                }
                Ok(token)
            }
            Err(e) if e.code == provider_codes::USER_TOKEN_EXPIRED => {
                info!("Session invalidated by identity service");
                self.forget_stored();
                self.state.lock().session = None;
                self.listeners.emit(None);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn observe(&self, listener: AuthStateListener) -> Subscription {
        let subscription = self.listeners.register(listener.clone());
        let initial = {
            let state = self.state.lock();
            state
                .restored
                .then(|| state.session.as_ref().map(|s| s.identity.clone()))
        };
        if let Some(identity) = initial {
            listener(identity);
        }
        subscription
    }
}

impl std::fmt::Debug for FirebaseIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseIdentityProvider")
            .field("project_id", &self.config.project_id)
            .field("identity_endpoint", &self.config.identity_endpoint)
            .finish()
    }
}
