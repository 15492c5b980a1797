//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{AppConfig, SyncConfig};
use crate::db::ServiceRepository;
use crate::shopify::AdminClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    shopify: AdminClient,
}

impl AppState {
    /// Build state from loaded configuration and a database pool.
    #[must_use]
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let shopify = AdminClient::new(&config.shopify);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                shopify,
            }),
        }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.shopify
    }

    /// Service store over this state's pool.
    #[must_use]
    pub fn services(&self) -> ServiceRepository<'_> {
        ServiceRepository::new(&self.inner.pool)
    }

    /// Field mappings for each sync call site.
    #[must_use]
    pub fn sync_config(&self) -> &SyncConfig {
        &self.inner.config.sync
    }
}
