//! Business logic services for the admin app.
//!
//! # Services
//!
//! - `catalog` - Service create/update/delete with best-effort metaobject mirroring

pub mod catalog;

pub use catalog::{create_service, delete_service, update_service};
