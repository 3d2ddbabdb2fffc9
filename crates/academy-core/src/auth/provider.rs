//! Identity provider seam

use super::identity::{Identity, Registration};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use thiserror::Error;

/// A provider failure tagged with a stable `auth/...` code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Callback fired with `Some(identity)` or `None` on every state change
pub type AuthStateListener = Arc<dyn Fn(Option<Identity>) + Send + Sync>;

/// A third-party identity service.
///
/// Implementations report the real state through [`IdentityProvider::observe`]
/// once they know it, and again on every change (sign-in, sign-out, token
/// invalidation).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password
    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<Identity, ProviderError>;

    /// Create an account and apply the optional profile fields
    async fn create_account(&self, registration: &Registration) -> Result<Identity, ProviderError>;

    /// Interactive federated sign-in (popup flow)
    async fn sign_in_with_federated(&self) -> Result<Identity, ProviderError>;

    /// Sign the current user out
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Send a password reset email
    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;

    /// Token for the current user, refreshed when close to expiry
    async fn id_token(&self) -> Result<Option<String>, ProviderError>;

    /// Register a state-change listener; dropping the subscription removes it
    fn observe(&self, listener: AuthStateListener) -> Subscription;
}

/// Guard for a registered listener.
///
/// Unsubscribes when dropped or when [`Subscription::unsubscribe`] is called.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Remove the listener now
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[derive(Default)]
struct ListenerSlots {
    next_id: u64,
    listeners: Vec<(u64, AuthStateListener)>,
}

/// Listener registry shared by provider implementations
#[derive(Clone, Default)]
pub struct AuthStateListeners {
    slots: Arc<Mutex<ListenerSlots>>,
}

impl AuthStateListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener and return its guard
    pub fn register(&self, listener: AuthStateListener) -> Subscription {
        let id = {
            let mut slots = self.slots.lock();
            slots.next_id += 1;
            let id = slots.next_id;
            slots.listeners.push((id, listener));
            id
        };
        let weak: Weak<Mutex<ListenerSlots>> = Arc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = weak.upgrade() {
                slots.lock().listeners.retain(|(slot_id, _)| *slot_id != id);
            }
        })
    }

    /// Call every listener with the given state
    ///
    /// Listeners run outside the registry lock, so they may subscribe or
    /// unsubscribe from inside the callback.
    pub fn emit(&self, identity: Option<&Identity>) {
        let listeners: Vec<AuthStateListener> = self
            .slots
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(identity.cloned());
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.slots.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
