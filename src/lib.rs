pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    blob_service::{BlobStorage, LocalBlobStorage},
    dashboard_service::DashboardService,
    hireflix_service::{HireflixService, InterviewProvider},
    lifecycle_service::LifecycleService,
};
use crate::store::ApplicationStore;

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: LifecycleService,
    pub dashboard: DashboardService,
    pub blob_storage: Arc<dyn BlobStorage>,
    pub interview_provider: Arc<dyn InterviewProvider>,
    /// Shared secret for webhook signatures; `None` accepts unsigned calls.
    pub webhook_secret: Option<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        blob_storage: Arc<dyn BlobStorage>,
        interview_provider: Arc<dyn InterviewProvider>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            lifecycle: LifecycleService::new(store.clone()),
            dashboard: DashboardService::new(store),
            blob_storage,
            interview_provider,
            webhook_secret,
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn ApplicationStore>) -> Result<Self> {
        let blob_storage = LocalBlobStorage::new(&config.uploads_dir, &config.public_base_url)?;
        let hireflix = HireflixService::new(
            config.hireflix_api_url.clone(),
            config.hireflix_api_key.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )?;

        Ok(Self::new(
            store,
            Arc::new(blob_storage),
            Arc::new(hireflix),
            config.hireflix_webhook_secret.clone(),
        ))
    }
}
