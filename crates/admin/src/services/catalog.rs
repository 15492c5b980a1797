//! Service mutations as two-phase operations.
//!
//! Each operation first commits locally; a store failure aborts it and is
//! returned as `Err`. The metaobject mirror runs only after the commit and
//! its outcome is attached to the [`Committed`] value.

use tracing::{info, instrument};
use zoo_product_form_core::ServiceId;

use crate::db::{RepositoryError, ServiceStore};
use crate::models::{Service, ServiceDraft};
use crate::shopify::GraphQLExecutor;
use crate::sync::{AddressBy, CatalogSync, Committed, FieldMapping, RemoteSyncResult, address_for_record};

/// Create a service, then mirror it as a new metaobject.
///
/// # Errors
///
/// Returns `RepositoryError` if the local insert fails. Remote failures are
/// reported in [`Committed::mirror`].
#[instrument(skip_all, fields(title = %draft.title()))]
pub async fn create_service<S: ServiceStore, G: GraphQLExecutor>(
    store: &S,
    remote: &G,
    mapping: &FieldMapping,
    draft: &ServiceDraft,
) -> Result<Committed<Service>, RepositoryError> {
    let service = store.create(draft).await?;
    info!(service_id = %service.id, "Service created");

    let mirror = CatalogSync::new(store, remote, mapping)
        .upsert(&service, AddressBy::NewEntry)
        .await;

    Ok(Committed::new(with_recorded_ref(service, &mirror), mirror))
}

/// Update a service, then mirror it by reference (or handle if never mirrored).
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the service doesn't exist, or
/// another `RepositoryError` if the local update fails.
#[instrument(skip_all, fields(service_id = %id))]
pub async fn update_service<S: ServiceStore, G: GraphQLExecutor>(
    store: &S,
    remote: &G,
    mapping: &FieldMapping,
    id: ServiceId,
    draft: &ServiceDraft,
) -> Result<Committed<Service>, RepositoryError> {
    let service = store.update(id, draft).await?;
    info!("Service updated");

    let address = address_for_record(&service);
    let mirror = CatalogSync::new(store, remote, mapping)
        .upsert(&service, address)
        .await;

    Ok(Committed::new(with_recorded_ref(service, &mirror), mirror))
}

/// Delete a service locally, then delete its metaobject if it has one.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the service doesn't exist, or
/// another `RepositoryError` if the local delete fails.
#[instrument(skip_all, fields(service_id = %id))]
pub async fn delete_service<S: ServiceStore, G: GraphQLExecutor>(
    store: &S,
    remote: &G,
    mapping: &FieldMapping,
    id: ServiceId,
) -> Result<Committed<Service>, RepositoryError> {
    let service = store.get(id).await?;
    store.delete(id).await?;
    info!("Service deleted");

    let mirror = CatalogSync::new(store, remote, mapping).delete(&service).await;

    Ok(Committed::new(service, mirror))
}

/// Reflect a reference stored during the mirror on the in-memory record.
fn with_recorded_ref(mut service: Service, mirror: &RemoteSyncResult) -> Service {
    if let RemoteSyncResult::Synced {
        remote_ref,
        ref_recorded: true,
    } = mirror
    {
        service.remote_ref = Some(remote_ref.clone());
    }
    service
}
