//! Session store
//!
//! Owns the process-wide "who is signed in" state. The state only changes
//! through provider reports or the store's own operations, and every
//! provider failure leaves it untouched.

use super::codes::translate_provider_error;
use super::identity::{Identity, Registration, SessionState};
use super::provider::{IdentityProvider, ProviderError, Subscription};
use crate::api::TokenSource;
use crate::config::timeouts;
use crate::error::{AuthError, AuthErrorKind};
use crate::events::{Notification, SharedNotifier};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument};

/// Authenticated session store
pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    state: Arc<watch::Sender<SessionState>>,
    subscription: Mutex<Option<Subscription>>,
    notifier: SharedNotifier,
    token_timeout: Duration,
}

fn replace_state(sender: &watch::Sender<SessionState>, next: SessionState) {
    sender.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

impl SessionStore {
    /// Create a store and subscribe it to provider state reports.
    ///
    /// The state starts as [`SessionState::Unknown`] and stays there until
    /// the provider reports.
    pub fn create(provider: Arc<dyn IdentityProvider>, notifier: SharedNotifier) -> Self {
        let (sender, _) = watch::channel(SessionState::Unknown);
        let state = Arc::new(sender);

        let reporter = Arc::clone(&state);
        let subscription = provider.observe(Arc::new(move |identity: Option<Identity>| {
            let next = SessionState::from_report(identity);
            debug!(
                authenticated = next.is_authenticated(),
                "Identity provider reported session state"
            );
            replace_state(&reporter, next);
        }));

        Self {
            provider,
            state,
            subscription: Mutex::new(Some(subscription)),
            notifier,
            token_timeout: timeouts::identity::request_timeout(),
        }
    }

    /// Upper bound on a token request
    pub fn with_token_timeout(mut self, timeout: Duration) -> Self {
        self.token_timeout = timeout;
        self
    }

    /// Stop listening to the provider. Later reports are ignored.
    pub fn teardown(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
            debug!("Session store unsubscribed from identity provider");
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state transition
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current identity, if signed in
    pub fn current_identity(&self) -> Option<Arc<Identity>> {
        self.state.borrow().identity().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Wait for the provider's first report
    pub async fn wait_until_known(&self) -> SessionState {
        let mut receiver = self.state.subscribe();
        match receiver.wait_for(SessionState::is_known).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Sign in with email and password
    #[instrument(skip_all)]
    pub async fn sign_in_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Arc<Identity>, AuthError> {
        let identity = self
            .provider
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| self.reject("Login", e))?;
        Ok(self.authenticate(identity))
    }

    /// Create an account, then apply the optional name and photo
    #[instrument(skip_all)]
    pub async fn register_with_credentials(
        &self,
        name: Option<&str>,
        photo_url: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<Arc<Identity>, AuthError> {
        let mut registration = Registration::new(email, password);
        if let Some(name) = name {
            registration = registration.with_name(name);
        }
        if let Some(photo_url) = photo_url {
            registration = registration.with_photo_url(photo_url);
        }

        let mut identity = self
            .provider
            .create_account(&registration)
            .await
            .map_err(|e| self.reject("Registration", e))?;

        // The provider may report the account before the profile update lands
        if identity.display_name.is_none() {
            identity.display_name = registration.name;
        }
        if identity.photo_url.is_none() {
            identity.photo_url = registration.photo_url;
        }
        Ok(self.authenticate(identity))
    }

    /// Interactive federated sign-in
    #[instrument(skip_all)]
    pub async fn sign_in_with_federated_provider(&self) -> Result<Arc<Identity>, AuthError> {
        let identity = self
            .provider
            .sign_in_with_federated()
            .await
            .map_err(|e| self.reject("Federated login", e))?;
        Ok(self.authenticate(identity))
    }

    /// Sign out and tell the user about the outcome
    #[instrument(skip_all)]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        match self.provider.sign_out().await {
            Ok(()) => {
                replace_state(&self.state, SessionState::Anonymous);
                info!("Signed out");
                self.notifier
                    .notify(Notification::success("Logged out successfully"));
                Ok(())
            }
            Err(e) => {
                let error = self.reject("Logout", e);
                self.notifier.notify(Notification::error("Failed to logout"));
                Err(error)
            }
        }
    }

    /// Ask the provider to email a password reset link
    #[instrument(skip_all)]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.provider
            .send_password_reset(email)
            .await
            .map_err(|e| self.reject("Password reset", e))
    }

    fn authenticate(&self, identity: Identity) -> Arc<Identity> {
        let identity = Arc::new(identity);
        info!(user = %identity.id, "Signed in");
        replace_state(&self.state, SessionState::Authenticated(Arc::clone(&identity)));
        identity
    }

    fn reject(&self, operation: &str, error: ProviderError) -> AuthError {
        let translated = translate_provider_error(&error);
        if translated.is_cancellation() {
            debug!(code = %error.code, "{} cancelled", operation);
        } else {
            error!(code = %error.code, kind = %translated.kind, "{} error: {}", operation, error.message);
        }
        translated
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .field("subscribed", &self.subscription.lock().is_some())
            .finish()
    }
}

#[async_trait]
impl TokenSource for SessionStore {
    async fn current_token(&self) -> Result<Option<String>, AuthError> {
        if !self.is_authenticated() {
            return Ok(None);
        }

        match tokio::time::timeout(self.token_timeout, self.provider.id_token()).await {
            Ok(Ok(token)) => Ok(token.filter(|token| !token.is_empty())),
            Ok(Err(e)) => Err(translate_provider_error(&e)),
            Err(_) => Err(AuthError::new(AuthErrorKind::Unknown)
                .with_message("Timed out fetching identity token")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryIdentityProvider;
    use crate::auth::provider_codes;
    use crate::events::{NotificationBus, SilentNotifier, drain};

    fn amina() -> Identity {
        Identity::new("u1")
            .with_email("amina@example.com")
            .with_display_name("Amina")
    }

    fn provider() -> Arc<MemoryIdentityProvider> {
        Arc::new(MemoryIdentityProvider::new().with_account("secret-pass", amina()))
    }

    fn store(provider: &Arc<MemoryIdentityProvider>) -> SessionStore {
        SessionStore::create(provider.clone(), Arc::new(SilentNotifier))
    }

    #[tokio::test]
    async fn test_initial_state_unknown_until_provider_reports() {
        let provider = Arc::new(
            MemoryIdentityProvider::new()
                .signed_in_as(amina())
                .with_pending_restore(),
        );
        let store = store(&provider);
        assert_eq!(store.state(), SessionState::Unknown);
        assert_eq!(store.current_token().await.unwrap(), None);

        provider.finish_restore();
        assert_eq!(
            store.wait_until_known().await,
            SessionState::Authenticated(Arc::new(amina()))
        );
    }

    #[tokio::test]
    async fn test_immediate_report_is_anonymous() {
        let provider = provider();
        let store = store(&provider);
        assert_eq!(store.state(), SessionState::Anonymous);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_in_success_transitions_and_issues_token() {
        let provider = provider();
        let store = store(&provider);
        let mut watcher = store.watch();

        let identity = store
            .sign_in_with_credentials("amina@example.com", "secret-pass")
            .await
            .unwrap();
        assert_eq!(identity.id, "u1");
        assert!(store.is_authenticated());
        assert!(watcher.has_changed().unwrap());
        assert_eq!(watcher.borrow_and_update().identity().map(|i| i.id.clone()), Some("u1".into()));

        let token = store.current_token().await.unwrap();
        assert_eq!(token.as_deref(), Some("memory-token-u1"));
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials_and_keeps_state() {
        let provider = provider();
        let store = store(&provider);

        let err = store
            .sign_in_with_credentials("amina@example.com", "nope")
            .await
            .unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::InvalidCredentials);
        assert_eq!(store.state(), SessionState::Anonymous);

        let err = store
            .sign_in_with_credentials("ghost@example.com", "nope")
            .await
            .unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::AccountNotFound);
    }

    #[tokio::test]
    async fn test_register_applies_profile() {
        let provider = provider();
        let store = store(&provider);

        let identity = store
            .register_with_credentials(
                Some("Yusuf"),
                Some("https://img/y.png"),
                "yusuf@example.com",
                "longenough",
            )
            .await
            .unwrap();
        assert_eq!(identity.display_name.as_deref(), Some("Yusuf"));
        assert_eq!(identity.photo_url.as_deref(), Some("https://img/y.png"));
        assert_eq!(store.current_identity(), Some(identity));

        let err = store
            .register_with_credentials(None, None, "amina@example.com", "longenough")
            .await
            .unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::EmailAlreadyRegistered);
    }

    #[tokio::test]
    async fn test_sign_out_notifies_success() {
        let provider = Arc::new(MemoryIdentityProvider::new().signed_in_as(amina()));
        let bus = NotificationBus::default();
        let mut notifications = bus.subscribe();
        let store = SessionStore::create(provider.clone(), Arc::new(bus));
        assert!(store.is_authenticated());

        store.sign_out().await.unwrap();
        assert_eq!(store.state(), SessionState::Anonymous);
        assert_eq!(
            drain(&mut notifications),
            vec![Notification::success("Logged out successfully")]
        );
    }

    #[tokio::test]
    async fn test_sign_out_failure_notifies_and_keeps_state() {
        let provider = Arc::new(MemoryIdentityProvider::new().signed_in_as(amina()));
        provider.fail_next_sign_out(ProviderError::new(
            provider_codes::NETWORK_REQUEST_FAILED,
            "offline",
        ));
        let bus = NotificationBus::default();
        let mut notifications = bus.subscribe();
        let store = SessionStore::create(provider.clone(), Arc::new(bus));

        let err = store.sign_out().await.unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::Unknown);
        assert!(store.is_authenticated());
        assert_eq!(
            drain(&mut notifications),
            vec![Notification::error("Failed to logout")]
        );
    }

    #[tokio::test]
    async fn test_federated_cancellation() {
        let provider = Arc::new(MemoryIdentityProvider::new().with_federated_outcome(Err(
            ProviderError::new(provider_codes::POPUP_CLOSED_BY_USER, "closed"),
        )));
        let store = store(&provider);

        let err = store.sign_in_with_federated_provider().await.unwrap_err();
        assert!(err.is_cancellation());
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_provider_revocation_moves_to_anonymous() {
        let provider = Arc::new(MemoryIdentityProvider::new().signed_in_as(amina()));
        let store = store(&provider);
        assert!(store.is_authenticated());

        provider.revoke_session();
        assert_eq!(store.state(), SessionState::Anonymous);
        assert_eq!(store.current_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_teardown_unsubscribes() {
        let provider = provider();
        let store = store(&provider);
        assert_eq!(provider.listener_count(), 1);

        store.teardown();
        assert_eq!(provider.listener_count(), 0);

        // Reports after teardown no longer reach the store
        provider
            .sign_in_with_password("amina@example.com", "secret-pass")
            .await
            .unwrap();
        assert_eq!(store.state(), SessionState::Anonymous);

        drop(store);
        assert_eq!(provider.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_password_reset_translates_errors() {
        let provider = provider();
        let store = store(&provider);

        store.request_password_reset("amina@example.com").await.unwrap();
        let err = store.request_password_reset("bad-email").await.unwrap_err();
        assert_eq!(err.kind, AuthErrorKind::InvalidEmail);
    }
}
