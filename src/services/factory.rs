use std::sync::Arc;
use std::time::Duration;

use super::local::{LocalDatabase, LocalTenderService, LocalUserService};
use super::remote::{ApiClient, RemoteTenderService, RemoteUserService};
use super::store::{FileStore, KeyValueStore, Session};
use super::{TenderService, UserService};
use crate::config::{ClientConfig, ServiceMode};

/// Builds the service pair for the configured mode.
///
/// Both modes share one store; it holds the session in either case and the
/// simulated collections in local mode.
pub struct ServiceFactory {
    config: ClientConfig,
    store: Arc<dyn KeyValueStore>,
    local: Arc<LocalDatabase>,
}

impl ServiceFactory {
    pub fn new(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let delay = Duration::from_millis(config.simulate_network_delay_ms);
        let local = Arc::new(LocalDatabase::new(store.clone(), delay));
        Self { config, store, local }
    }

    /// Persists under `config.data_dir`
    pub fn with_file_store(config: ClientConfig) -> Self {
        let store = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::new(config, store)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> Session {
        Session::new(self.store.clone())
    }

    fn api_client(&self) -> ApiClient {
        ApiClient::new(self.config.api_base_url.clone(), self.session())
    }

    pub fn tender_service(&self) -> Arc<dyn TenderService> {
        match self.config.mode {
            ServiceMode::Remote => Arc::new(RemoteTenderService::new(self.api_client())),
            ServiceMode::Local => Arc::new(LocalTenderService::new(self.local.clone())),
        }
    }

    pub fn user_service(&self) -> Arc<dyn UserService> {
        match self.config.mode {
            ServiceMode::Remote => Arc::new(RemoteUserService::new(self.api_client())),
            ServiceMode::Local => Arc::new(LocalUserService::new(self.local.clone())),
        }
    }
}
