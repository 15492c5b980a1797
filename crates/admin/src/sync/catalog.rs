//! Per-record metaobject mirroring.

use tracing::{debug, info, instrument, warn};

use super::{AddressBy, FieldMapping, RemoteSyncResult, SERVICE_METAOBJECT_TYPE, metaobject_fields};
use crate::db::ServiceStore;
use crate::models::Service;
use crate::shopify::GraphQLExecutor;
use crate::shopify::metaobjects::{delete_metaobject, write_metaobject};

/// Mirrors services into `zoo_service` metaobjects.
///
/// Every method is infallible from the caller's point of view: failures are
/// logged and returned as a [`RemoteSyncResult`].
pub struct CatalogSync<'a, S, G> {
    store: &'a S,
    remote: &'a G,
    mapping: &'a FieldMapping,
}

impl<'a, S: ServiceStore, G: GraphQLExecutor> CatalogSync<'a, S, G> {
    #[must_use]
    pub const fn new(store: &'a S, remote: &'a G, mapping: &'a FieldMapping) -> Self {
        Self {
            store,
            remote,
            mapping,
        }
    }

    /// Create or update the metaobject for `service` at `address`.
    ///
    /// On the first successful write the returned GID is stored on the
    /// service with a single follow-up write. A service that already has a
    /// reference keeps it.
    #[instrument(skip_all, fields(service_id = %service.id, address = ?address))]
    pub async fn upsert(&self, service: &Service, address: AddressBy) -> RemoteSyncResult {
        let fields = metaobject_fields(service, self.mapping);

        let payload =
            match write_metaobject(self.remote, SERVICE_METAOBJECT_TYPE, &address, &fields).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "Metaobject write failed");
                    return RemoteSyncResult::Failed(e.to_string());
                }
            };

        if !payload.user_errors.is_empty() {
            let result = RemoteSyncResult::Rejected(payload.user_errors);
            warn!(
                errors = %result.failure_reason().unwrap_or_default(),
                "Metaobject write rejected"
            );
            return result;
        }

        let Some(metaobject) = payload.metaobject else {
            warn!("Metaobject write returned neither a metaobject nor errors");
            return RemoteSyncResult::Failed("no metaobject returned".to_string());
        };

        let ref_recorded = match service.remote_ref.as_deref() {
            Some(stored) => {
                if stored != metaobject.id {
                    warn!(
                        stored_ref = %stored,
                        returned_ref = %metaobject.id,
                        "Written metaobject differs from stored reference, keeping stored"
                    );
                }
                false
            }
            None => match self.store.set_remote_ref(service.id, &metaobject.id).await {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "Could not record metaobject reference");
                    false
                }
            },
        };

        info!(remote_ref = %metaobject.id, handle = %metaobject.handle, "Service mirrored");

        RemoteSyncResult::Synced {
            remote_ref: metaobject.id,
            ref_recorded,
        }
    }

    /// Delete the metaobject mirroring `service`, if it has one.
    #[instrument(skip_all, fields(service_id = %service.id))]
    pub async fn delete(&self, service: &Service) -> RemoteSyncResult {
        let Some(remote_ref) = service.remote_ref.as_deref() else {
            debug!("Service was never mirrored, nothing to delete");
            return RemoteSyncResult::Skipped;
        };

        match delete_metaobject(self.remote, remote_ref).await {
            Ok(payload) if payload.user_errors.is_empty() => {
                info!(remote_ref = %remote_ref, "Metaobject deleted");
                RemoteSyncResult::Removed {
                    remote_ref: remote_ref.to_string(),
                }
            }
            Ok(payload) => {
                let result = RemoteSyncResult::Rejected(payload.user_errors);
                warn!(
                    remote_ref = %remote_ref,
                    errors = %result.failure_reason().unwrap_or_default(),
                    "Metaobject delete rejected"
                );
                result
            }
            Err(e) => {
                warn!(remote_ref = %remote_ref, error = %e, "Metaobject delete failed");
                RemoteSyncResult::Failed(e.to_string())
            }
        }
    }
}
