//! CLI command implementations.

pub mod migrate;
pub mod sync;

use thiserror::Error;
use zoo_product_form_admin::config::ConfigError;
use zoo_product_form_admin::sync::BootstrapError;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Metaobject definition could not be ensured.
    #[error("Bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),

    /// Report serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backfill finished with failures.
    #[error("Backfill incomplete: {failed} of {total} services failed")]
    BackfillIncomplete { failed: usize, total: usize },

    /// Backfill aborted before syncing any service.
    #[error("Backfill aborted: {0}")]
    BackfillAborted(String),
}
