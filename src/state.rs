use std::sync::Arc;

use crate::api::LinkBuilder;
use crate::auth::{self, ContextProvider, Policies};
use crate::config::AppConfig;
use crate::database::Store;

/// Shared application state, cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub policies: Policies,
    pub context: Arc<dyn ContextProvider>,
    pub config: Arc<AppConfig>,
    pub links: LinkBuilder,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            policies: Policies::from_config(&config.security),
            context: Arc::from(auth::provider_from_config(&config.security)),
            links: LinkBuilder::new(config.api.base_url.clone()),
            config: Arc::new(config),
        }
    }

    pub fn with_context_provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.context = provider;
        self
    }

    pub fn with_policies(mut self, policies: Policies) -> Self {
        self.policies = policies;
        self
    }
}
