//! In-process identity provider
//!
//! Backs offline use of the CLI and the test suite. Accounts live in a map
//! and tokens are opaque strings derived from the user id.

use super::codes::provider_codes;
use super::identity::{Identity, Registration};
use super::provider::{
    AuthStateListener, AuthStateListeners, IdentityProvider, ProviderError, Subscription,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    password: String,
    disabled: bool,
}

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<String, Account>,
    current: Option<Identity>,
    restoring: bool,
    next_uid: u64,
    federated: Option<Result<Identity, ProviderError>>,
    sign_out_failure: Option<ProviderError>,
    reset_requests: Vec<String>,
}

/// Identity provider that keeps everything in memory
#[derive(Default)]
pub struct MemoryIdentityProvider {
    state: Mutex<MemoryState>,
    listeners: AuthStateListeners,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold back the initial state report until [`Self::finish_restore`]
    pub fn with_pending_restore(self) -> Self {
        self.state.lock().restoring = true;
        self
    }

    /// Add an account that can sign in with the given password
    pub fn with_account(self, password: impl Into<String>, identity: Identity) -> Self {
        self.add_account(password, identity, false);
        self
    }

    /// Add an account that exists but is disabled
    pub fn with_disabled_account(self, password: impl Into<String>, identity: Identity) -> Self {
        self.add_account(password, identity, true);
        self
    }

    /// Start signed in as the given identity
    pub fn signed_in_as(self, identity: Identity) -> Self {
        self.state.lock().current = Some(identity);
        self
    }

    /// Outcome of the next federated sign-in attempts
    pub fn with_federated_outcome(self, outcome: Result<Identity, ProviderError>) -> Self {
        self.state.lock().federated = Some(outcome);
        self
    }

    /// Make the next sign-out fail with the given error
    pub fn fail_next_sign_out(&self, error: ProviderError) {
        self.state.lock().sign_out_failure = Some(error);
    }

    /// Report the real state to listeners registered while restoring
    pub fn finish_restore(&self) {
        let current = {
            let mut state = self.state.lock();
            state.restoring = false;
            state.current.clone()
        };
        self.listeners.emit(current.as_ref());
    }

    /// Drop the current session as if its token had been revoked
    pub fn revoke_session(&self) {
        self.state.lock().current = None;
        self.listeners.emit(None);
    }

    /// Emails that password resets were requested for
    pub fn reset_requests(&self) -> Vec<String> {
        self.state.lock().reset_requests.clone()
    }

    /// Number of registered state listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn add_account(&self, password: impl Into<String>, identity: Identity, disabled: bool) {
        let key = identity.email.as_deref().map(normalize_email).unwrap_or_default();
        self.state.lock().accounts.insert(
            key,
            Account {
                identity,
                password: password.into(),
                disabled,
            },
        );
    }

    fn sign_in_as(&self, identity: Identity) -> Identity {
        self.state.lock().current = Some(identity.clone());
        self.listeners.emit(Some(&identity));
        identity
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<String, ProviderError> {
    let email = normalize_email(email);
    let valid = email
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
    if valid {
        Ok(email)
    } else {
        Err(ProviderError::new(
            provider_codes::INVALID_EMAIL,
            "The email address is badly formatted.",
        ))
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, ProviderError> {
        let email = validate_email(email)?;
        let identity = {
            let state = self.state.lock();
            let account = state.accounts.get(&email).ok_or_else(|| {
                ProviderError::new(provider_codes::USER_NOT_FOUND, "There is no user record.")
            })?;
            if account.disabled {
                return Err(ProviderError::new(
                    provider_codes::USER_DISABLED,
                    "The user account has been disabled.",
                ));
            }
            if account.password != password {
                return Err(ProviderError::new(
                    provider_codes::WRONG_PASSWORD,
                    "The password is invalid.",
                ));
            }
            account.identity.clone()
        };
        Ok(self.sign_in_as(identity))
    }

    async fn create_account(&self, registration: &Registration) -> Result<Identity, ProviderError> {
        let email = validate_email(&registration.email)?;
        if registration.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ProviderError::new(
                provider_codes::WEAK_PASSWORD,
                "Password should be at least 6 characters",
            ));
        }

        let identity = {
            let mut state = self.state.lock();
            if state.accounts.contains_key(&email) {
                return Err(ProviderError::new(
                    provider_codes::EMAIL_ALREADY_IN_USE,
                    "The email address is already in use by another account.",
                ));
            }
            state.next_uid += 1;
            let identity = Identity {
                id: format!("memory-user-{}", state.next_uid),
                display_name: registration.name.clone(),
                email: Some(email.clone()),
                photo_url: registration.photo_url.clone(),
            };
            state.accounts.insert(
                email,
                Account {
                    identity: identity.clone(),
                    password: registration.password.clone(),
                    disabled: false,
                },
            );
            identity
        };
        Ok(self.sign_in_as(identity))
    }

    async fn sign_in_with_federated(&self) -> Result<Identity, ProviderError> {
        let outcome = self.state.lock().federated.clone();
        match outcome {
            Some(Ok(identity)) => Ok(self.sign_in_as(identity)),
            Some(Err(error)) => Err(error),
            None => Err(ProviderError::new(
                provider_codes::OPERATION_NOT_SUPPORTED,
                "No federated provider is configured.",
            )),
        }
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        {
            let mut state = self.state.lock();
            if let Some(error) = state.sign_out_failure.take() {
                return Err(error);
            }
            state.current = None;
        }
        self.listeners.emit(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let email = validate_email(email)?;
        let mut state = self.state.lock();
        if !state.accounts.contains_key(&email) {
            return Err(ProviderError::new(
                provider_codes::USER_NOT_FOUND,
                "There is no user record.",
            ));
        }
        state.reset_requests.push(email);
        Ok(())
    }

    async fn id_token(&self) -> Result<Option<String>, ProviderError> {
        Ok(self
            .state
            .lock()
            .current
            .as_ref()
            .map(|identity| format!("memory-token-{}", identity.id)))
    }

    fn observe(&self, listener: AuthStateListener) -> Subscription {
        let subscription = self.listeners.register(listener.clone());
        let initial = {
            let state = self.state.lock();
            (!state.restoring).then(|| state.current.clone())
        };
        if let Some(current) = initial {
            listener(current);
        }
        subscription
    }
}
