//! Metaobject handles.
//!
//! A handle addresses a remote metaobject within its type without knowing the
//! identifier Shopify assigned to it. Handles for mirrored services are a pure
//! function of the local service ID, so they can be recomputed at any time.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::ServiceId;

/// Prefix shared by every handle derived from a service.
pub const SERVICE_HANDLE_PREFIX: &str = "service-";

/// A type-scoped metaobject handle (e.g. `service-12`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaobjectHandle(String);

impl MetaobjectHandle {
    /// The stable handle for a locally stored service.
    #[must_use]
    pub fn for_service(id: ServiceId) -> Self {
        Self(format!("{SERVICE_HANDLE_PREFIX}{id}"))
    }

    /// Borrow the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetaobjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
