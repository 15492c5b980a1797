//! Database migration command.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migration files live in `crates/admin/migrations/` and are embedded in the
//! admin library at build time.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use zoo_product_form_admin::config::ConfigError;
use zoo_product_form_admin::db::MIGRATOR;

use super::CommandError;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing, the connection fails, or a
/// migration fails.
pub async fn run() -> Result<(), CommandError> {
    let _ = dotenvy::dotenv();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
