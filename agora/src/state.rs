use std::sync::Arc;

use agora_core::ModerationScanner;
use agora_store::DataStore;

use crate::config::AppConfig;
use crate::services::DeliberationService;

/// Shared application state across all routes and services
pub struct AppState {
    /// Loaded configuration
    pub config: AppConfig,

    /// Write and read paths over the data store
    pub deliberation: DeliberationService,
}

impl AppState {
    /// Create a new instance of AppState
    pub fn new(config: AppConfig, store: Arc<dyn DataStore>, scanner: ModerationScanner) -> Self {
        let deliberation = DeliberationService::new(store, scanner, config.clone());
        Self {
            config,
            deliberation,
        }
    }

    /// Get a reference to the deliberation service
    pub fn deliberation(&self) -> &DeliberationService {
        &self.deliberation
    }
}

pub type SharedState = Arc<AppState>;
