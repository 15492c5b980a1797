//! Remote catalog sync.
//!
//! Local persistence is authoritative. Mirroring a service into its Shopify
//! metaobject happens after the local write has committed and never undoes
//! it: every remote outcome is captured as a [`RemoteSyncResult`] next to the
//! committed value in a [`Committed`].
//!
//! # Addressing
//!
//! Two call sites address the remote entry differently:
//!
//! - per-record create/edit ([`address_for_record`]): by stored reference
//!   once known, otherwise by the service handle (or as a brand-new entry
//!   when the record was just created);
//! - backfill ([`bootstrap::backfill_all`]): always by handle
//!   `service-<id>`, even when a reference is stored.
//!
//! The two can diverge for records first mirrored as new entries. This is
//! kept visible: a divergent identifier is logged, and the stored reference
//! is never overwritten.

pub mod bootstrap;
pub mod catalog;

use zoo_product_form_core::MetaobjectHandle;

use crate::models::Service;
pub use crate::shopify::metaobjects::{AddressBy, UserError};
use crate::shopify::metaobjects::MetaobjectFieldInput;

pub use bootstrap::{
    BootstrapError, LogLevel, LogLine, SyncReport, backfill_all, ensure_definition, find_definition,
};
pub use catalog::CatalogSync;

/// Metaobject type every service is mirrored as.
pub const SERVICE_METAOBJECT_TYPE: &str = "zoo_service";

/// Remote field keys for one sync call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    image_key: String,
}

impl FieldMapping {
    #[must_use]
    pub fn new(image_key: impl Into<String>) -> Self {
        Self {
            image_key: image_key.into(),
        }
    }

    /// Key the image URL is written under.
    #[must_use]
    pub fn image_key(&self) -> &str {
        &self.image_key
    }
}

/// Outcome of one best-effort mirror operation.
///
/// None of these variants is a failure of the local operation that
/// triggered the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSyncResult {
    /// The metaobject was written.
    Synced {
        /// GID Shopify returned for the written entry.
        remote_ref: String,
        /// Whether this write stored the reference on the service.
        ref_recorded: bool,
    },
    /// The metaobject was deleted.
    Removed {
        remote_ref: String,
    },
    /// Shopify answered with `userErrors`.
    Rejected(Vec<UserError>),
    /// The call itself failed (transport, status, malformed response).
    Failed(String),
    /// Nothing to do remotely.
    Skipped,
}

impl RemoteSyncResult {
    /// Whether the remote side now reflects the local change.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Synced { .. } | Self::Removed { .. } | Self::Skipped)
    }

    /// Short human-readable reason for an unsuccessful outcome.
    #[must_use]
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Rejected(errors) => Some(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Self::Failed(message) => Some(message.clone()),
            Self::Synced { .. } | Self::Removed { .. } | Self::Skipped => None,
        }
    }

    /// Query-string value for the post-redirect notice.
    #[must_use]
    pub const fn notice(&self) -> &'static str {
        match self {
            Self::Synced { .. } | Self::Removed { .. } => "ok",
            Self::Skipped => "skipped",
            Self::Rejected(_) | Self::Failed(_) => "failed",
        }
    }
}

/// A committed local write together with the outcome of its mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    /// Authoritative result of the local operation.
    pub value: T,
    /// Secondary outcome of the remote mirror.
    pub mirror: RemoteSyncResult,
}

impl<T> Committed<T> {
    #[must_use]
    pub const fn new(value: T, mirror: RemoteSyncResult) -> Self {
        Self { value, mirror }
    }
}

/// Address used when a single record is edited.
#[must_use]
pub fn address_for_record(service: &Service) -> AddressBy {
    service.remote_ref.as_ref().map_or_else(
        || AddressBy::Handle(MetaobjectHandle::for_service(service.id)),
        |remote_ref| AddressBy::Reference(remote_ref.clone()),
    )
}

/// Remote field set for a service: `title` always, the rest only when set.
#[must_use]
pub fn metaobject_fields(service: &Service, mapping: &FieldMapping) -> Vec<MetaobjectFieldInput> {
    let mut fields = vec![MetaobjectFieldInput::new("title", service.title.clone())];

    if let Some(description) = non_empty(service.description.as_deref()) {
        fields.push(MetaobjectFieldInput::new("description", description));
    }
    if let Some(image_url) = non_empty(service.image_url.as_deref()) {
        fields.push(MetaobjectFieldInput::new(mapping.image_key(), image_url));
    }

    fields
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use zoo_product_form_core::ServiceId;

    use super::*;

    fn service(description: Option<&str>, image_url: Option<&str>) -> Service {
        let now = Utc::now();
        Service {
            id: ServiceId::new(4),
            title: "Penguin parade".to_string(),
            description: description.map(String::from),
            image_url: image_url.map(String::from),
            remote_ref: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_fields_title_only() {
        let fields = metaobject_fields(&service(None, None), &FieldMapping::new("image"));
        assert_eq!(fields, vec![MetaobjectFieldInput::new("title", "Penguin parade")]);
    }

    #[test]
    fn test_fields_skip_empty_description() {
        let fields = metaobject_fields(&service(Some(""), None), &FieldMapping::new("image"));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_fields_use_mapped_image_key() {
        let svc = service(Some("Daily at 3pm"), Some("https://cdn.example.com/p.jpg"));

        let record = metaobject_fields(&svc, &FieldMapping::new("image"));
        let backfill = metaobject_fields(&svc, &FieldMapping::new("image_url"));

        assert_eq!(record[1], MetaobjectFieldInput::new("description", "Daily at 3pm"));
        assert_eq!(record[2].key, "image");
        assert_eq!(backfill[2].key, "image_url");
        assert_eq!(backfill[2].value, "https://cdn.example.com/p.jpg");
    }

    #[test]
    fn test_address_for_record_prefers_reference() {
        let mut svc = service(None, None);
        assert_eq!(
            address_for_record(&svc),
            AddressBy::Handle(MetaobjectHandle::for_service(ServiceId::new(4)))
        );

        svc.remote_ref = Some("gid://shopify/Metaobject/88".to_string());
        assert_eq!(
            address_for_record(&svc),
            AddressBy::Reference("gid://shopify/Metaobject/88".to_string())
        );
    }

    #[test]
    fn test_remote_sync_result_classification() {
        let synced = RemoteSyncResult::Synced {
            remote_ref: "gid://shopify/Metaobject/1".to_string(),
            ref_recorded: true,
        };
        assert!(synced.is_success());
        assert_eq!(synced.notice(), "ok");
        assert_eq!(synced.failure_reason(), None);

        let rejected = RemoteSyncResult::Rejected(vec![UserError {
            field: Some(vec!["handle".to_string()]),
            message: "Handle is taken".to_string(),
        }]);
        assert!(!rejected.is_success());
        assert_eq!(rejected.notice(), "failed");
        assert_eq!(rejected.failure_reason().as_deref(), Some("handle: Handle is taken"));

        assert_eq!(RemoteSyncResult::Skipped.notice(), "skipped");
        assert!(RemoteSyncResult::Skipped.is_success());
    }
}
