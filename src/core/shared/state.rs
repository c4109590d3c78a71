use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::directory::IdentityProvider;
use crate::store::Store;

/// Shared by every handler behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, identity: Arc<dyn IdentityProvider>, config: AppConfig) -> Self {
        Self {
            store,
            identity,
            config,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &"Arc<dyn Store>")
            .field("identity", &"Arc<dyn IdentityProvider>")
            .field("config", &self.config)
            .finish()
    }
}
