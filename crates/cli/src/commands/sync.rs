//! Metaobject sync commands.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string (backfill only)
//! - `SHOPIFY_STORE`, `SHOPIFY_ADMIN_ACCESS_TOKEN` - Admin API access
//! - `BACKFILL_IMAGE_FIELD_KEY` - image field key (default: `image_url`)

use secrecy::SecretString;
use zoo_product_form_admin::config::{ConfigError, ShopifyAdminConfig, SyncConfig};
use zoo_product_form_admin::db::{ServiceRepository, create_pool};
use zoo_product_form_admin::shopify::AdminClient;
use zoo_product_form_admin::sync::{LogLevel, backfill_all, ensure_definition};

use super::CommandError;

/// Ensure the `zoo_service` definition exists and print its GID.
///
/// # Errors
///
/// Returns an error if configuration is missing or the definition can't be
/// found or created.
pub async fn definition() -> Result<(), CommandError> {
    let client = AdminClient::new(&ShopifyAdminConfig::from_env()?);
    tracing::info!(endpoint = %client.endpoint(), "Checking metaobject definition");

    let definition = ensure_definition(&client).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{} {}", definition.type_name, definition.id);
    }
    Ok(())
}

/// Run the catalog backfill and print its log.
///
/// # Errors
///
/// Returns an error if configuration is missing, the run aborts, or any
/// service failed to sync.
#[allow(clippy::print_stdout)]
pub async fn backfill(json: bool) -> Result<(), CommandError> {
    let client = AdminClient::new(&ShopifyAdminConfig::from_env()?);
    tracing::info!(endpoint = %client.endpoint(), "Starting metaobject backfill");
    let sync = SyncConfig::from_env()?;
    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;
    let pool = create_pool(&database_url).await?;

    let store = ServiceRepository::new(&pool);
    let report = backfill_all(&store, &client, &sync.backfill).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in &report.log_lines {
            let tag = match line.level {
                LogLevel::Info => "info",
                LogLevel::Success => " ok ",
                LogLevel::Error => "FAIL",
            };
            println!("[{tag}] {}", line.message);
        }
        println!(
            "{} services: {} synced, {} failed",
            report.total, report.success_count, report.error_count
        );
    }

    if let Some(fatal) = report.fatal {
        return Err(CommandError::BackfillAborted(fatal));
    }
    if report.error_count > 0 {
        return Err(CommandError::BackfillIncomplete {
            failed: report.error_count,
            total: report.total,
        });
    }
    Ok(())
}
