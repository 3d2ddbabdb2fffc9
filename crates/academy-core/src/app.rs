//! Wiring of the client services

use crate::api::ApiClient;
use crate::auth::{IdentityProvider, SessionStore};
use crate::catalog::CatalogService;
use crate::config::AppConfig;
use crate::error::AcademyResult;
use crate::events::SharedNotifier;
use crate::query::QueryClient;
use std::sync::Arc;
use tracing::debug;

/// Every client service, constructed once and shared by reference.
///
/// The API client takes its tokens from the session store and every
/// service reports to the same notifier.
pub struct Academy {
    pub config: AppConfig,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub queries: QueryClient,
    pub catalog: CatalogService,
}

impl Academy {
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn IdentityProvider>,
        notifier: SharedNotifier,
    ) -> AcademyResult<Self> {
        config.validate()?;

        let session = Arc::new(SessionStore::create(provider, Arc::clone(&notifier)));
        let api = ApiClient::new(config.api.clone())?
            .with_token_source(session.clone())
            .with_notifier(Arc::clone(&notifier));
        let queries = QueryClient::new(config.query.clone());
        let catalog = CatalogService::new(api.clone(), queries.clone(), Arc::clone(&session))
            .with_notifier(notifier);

        debug!(base_url = %api.base_url(), "Academy client ready");
        Ok(Self {
            config,
            session,
            api,
            queries,
            catalog,
        })
    }

    /// Unsubscribe from the identity provider and drop cached reads
    pub fn teardown(&self) {
        self.session.teardown();
        self.queries.clear();
    }
}

impl std::fmt::Debug for Academy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Academy")
            .field("session", &self.session)
            .field("api", &self.api)
            .field("queries", &self.queries)
            .finish()
    }
}
