//! Zoo product form core - shared types.
//!
//! Used by:
//! - `admin` - the embedded admin app (routes, store, Shopify sync)
//! - `cli` - migrations and operator sync commands
//!
//! No I/O lives here. Database support for the ID newtypes is behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and metaobject handles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
