//! Metaobject definition bootstrap and catalog backfill.
//!
//! Instance writes fail until the `zoo_service` definition exists in the
//! shop. [`ensure_definition`] creates it when missing; [`backfill_all`]
//! then mirrors every stored service by handle.
//!
//! The backfill runs one Admin API call at a time.

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument};
use zoo_product_form_core::MetaobjectHandle;

use super::{AddressBy, CatalogSync, FieldMapping, RemoteSyncResult, SERVICE_METAOBJECT_TYPE, UserError};
use crate::db::ServiceStore;
use crate::shopify::metaobjects::{
    DefinitionAccess, DefinitionInput, FieldDefinitionInput, MetaobjectDefinition,
    create_definition, list_definitions,
};
use crate::shopify::{AdminShopifyError, GraphQLExecutor};

/// Page size used when looking up existing definitions.
pub const DEFINITION_PAGE_SIZE: i64 = 50;

/// Errors that abort [`ensure_definition`].
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The Admin API call failed.
    #[error("Shopify request failed: {0}")]
    Remote(#[from] AdminShopifyError),

    /// Shopify refused to create the definition.
    #[error("definition rejected: {}", format_user_errors(.0))]
    Rejected(Vec<UserError>),

    /// Creation reported no errors but returned no definition.
    #[error("definition create returned no definition")]
    MissingDefinition,
}

fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Severity of a backfill log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

/// One human-readable backfill log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

/// Result of a backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Services considered.
    pub total: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub log_lines: Vec<LogLine>,
    /// Error that stopped the run before any record was attempted.
    pub fatal: Option<String>,
}

impl SyncReport {
    fn aborted(message: String) -> Self {
        let mut report = Self::default();
        report.log(LogLevel::Error, message.clone());
        report.fatal = Some(message);
        report
    }

    fn log(&mut self, level: LogLevel, message: String) {
        self.log_lines.push(LogLine { level, message });
    }

    /// Whether every record synced and nothing aborted the run.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.fatal.is_none() && self.error_count == 0
    }
}

/// The `zoo_service` definition this app creates.
#[must_use]
pub fn service_definition() -> DefinitionInput {
    let field = |name: &str, key: &str, type_name: &str, required: bool| FieldDefinitionInput {
        name: name.to_string(),
        key: key.to_string(),
        type_name: type_name.to_string(),
        required,
    };

    DefinitionInput {
        name: "Zoo Service".to_string(),
        type_name: SERVICE_METAOBJECT_TYPE.to_string(),
        access: DefinitionAccess {
            storefront: "PUBLIC_READ".to_string(),
        },
        field_definitions: vec![
            field("Title", "title", "single_line_text_field", true),
            field("Description", "description", "multi_line_text_field", false),
            field("Image URL", "image_url", "url", false),
        ],
    }
}

/// Look up the `zoo_service` definition without creating it.
///
/// # Errors
///
/// Returns an error if the definitions query fails.
pub async fn find_definition<G: GraphQLExecutor>(
    remote: &G,
) -> Result<Option<MetaobjectDefinition>, AdminShopifyError> {
    let definitions = list_definitions(remote, DEFINITION_PAGE_SIZE).await?;
    Ok(definitions
        .into_iter()
        .find(|d| d.type_name == SERVICE_METAOBJECT_TYPE))
}

/// Make sure the `zoo_service` definition exists, creating it if needed.
///
/// Checks the shop on every call; nothing is cached.
///
/// # Errors
///
/// Returns `BootstrapError` if the lookup or the creation fails, including
/// when creation answers with user errors.
#[instrument(skip_all)]
pub async fn ensure_definition<G: GraphQLExecutor>(
    remote: &G,
) -> Result<MetaobjectDefinition, BootstrapError> {
    if let Some(existing) = find_definition(remote).await? {
        info!(definition_id = %existing.id, "Metaobject definition already exists");
        return Ok(existing);
    }

    let payload = create_definition(remote, &service_definition()).await?;

    if !payload.user_errors.is_empty() {
        let err = BootstrapError::Rejected(payload.user_errors);
        error!(error = %err, "Could not create metaobject definition");
        return Err(err);
    }

    let definition = payload
        .metaobject_definition
        .ok_or(BootstrapError::MissingDefinition)?;
    info!(definition_id = %definition.id, "Metaobject definition created");
    Ok(definition)
}

/// Mirror every stored service by handle `service-<id>`.
///
/// Never stops on a per-record failure. Only a failed definition check or a
/// failed store listing aborts the run, reported through
/// [`SyncReport::fatal`].
#[instrument(skip_all)]
pub async fn backfill_all<S: ServiceStore, G: GraphQLExecutor>(
    store: &S,
    remote: &G,
    mapping: &FieldMapping,
) -> SyncReport {
    if let Err(e) = ensure_definition(remote).await {
        error!(error = %e, "Backfill aborted");
        return SyncReport::aborted(format!("Metaobject definition unavailable: {e}"));
    }

    let services = match store.list().await {
        Ok(services) => services,
        Err(e) => {
            error!(error = %e, "Backfill aborted");
            return SyncReport::aborted(format!("Could not load services: {e}"));
        }
    };

    let sync = CatalogSync::new(store, remote, mapping);
    let mut report = SyncReport {
        total: services.len(),
        ..SyncReport::default()
    };

    for service in &services {
        let handle = MetaobjectHandle::for_service(service.id);
        report.log(
            LogLevel::Info,
            format!("Syncing service {} \"{}\" as {handle}", service.id, service.title),
        );

        match sync.upsert(service, AddressBy::Handle(handle)).await {
            RemoteSyncResult::Synced { remote_ref, .. } => {
                report.success_count += 1;
                report.log(
                    LogLevel::Success,
                    format!("Synced service {} to {remote_ref}", service.id),
                );
            }
            other => {
                report.error_count += 1;
                report.log(
                    LogLevel::Error,
                    format!(
                        "Failed to sync service {}: {}",
                        service.id,
                        other.failure_reason().unwrap_or_default()
                    ),
                );
            }
        }
    }

    info!(
        total = report.total,
        succeeded = report.success_count,
        failed = report.error_count,
        "Backfill finished"
    );
    report
}
