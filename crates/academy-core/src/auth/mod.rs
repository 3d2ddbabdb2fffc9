//! Authentication
//!
//! Provides:
//! - [`SessionStore`]: the single source of truth for who is signed in
//! - [`IdentityProvider`]: the seam to a third-party identity service
//! - [`FirebaseIdentityProvider`] and [`MemoryIdentityProvider`] adapters
//! - [`SessionStorage`] for restoring a session in a later process

mod codes;
pub mod firebase;
mod identity;
mod memory;
mod provider;
mod session;
mod storage;

pub use codes::{provider_codes, translate_provider_error};
pub use firebase::FirebaseIdentityProvider;
pub use identity::{Identity, Registration, SessionState};
pub use memory::MemoryIdentityProvider;
pub use provider::{
    AuthStateListener, AuthStateListeners, IdentityProvider, ProviderError, Subscription,
};
pub use session::SessionStore;
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage, StoredSession};
