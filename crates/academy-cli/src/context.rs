//! Connects the CLI to the backend and identity provider

use crate::console::{CliConsole, ConsoleNotifier};
use academy_core::{
    Academy, FileSessionStorage, FirebaseIdentityProvider, IdentityProvider,
    MemoryIdentityProvider, load_from_env,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

/// Load configuration, restore the persisted session and wire the services
pub async fn connect(console: CliConsole) -> Result<Academy> {
    let config = load_from_env().context("Failed to load configuration")?;

    let provider: Arc<dyn IdentityProvider> = match &config.firebase {
        Some(firebase) => {
            let storage = FileSessionStorage::default_location()
                .context("Failed to open the session file")?;
            debug!(path = %storage.path().display(), "Using persisted session");
            let provider = FirebaseIdentityProvider::new(firebase.clone(), Arc::new(storage))?;
            provider.restore().await;
            Arc::new(provider)
        }
        None => {
            console.warn(
                "No identity provider configured (ACADEMY_FIREBASE_API_KEY); sessions last for this command only",
            );
            Arc::new(MemoryIdentityProvider::new())
        }
    };

    let notifier = Arc::new(ConsoleNotifier::new(console));
    let academy = Academy::new(config, provider, notifier)?;
    academy.session.wait_until_known().await;
    Ok(academy)
}
