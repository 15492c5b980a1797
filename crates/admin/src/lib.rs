//! Zoo product form admin library.
//!
//! An embedded Shopify admin app that manages catalog services in
//! `PostgreSQL` and mirrors each one into a `zoo_service` metaobject.
//!
//! # Layers
//!
//! - [`db`] - the service store (source of truth)
//! - [`shopify`] - Admin GraphQL execution and metaobject operations
//! - [`sync`] - best-effort mirroring, definition bootstrap, backfill
//! - [`services`] - create/update/delete as commit-then-mirror operations
//! - [`routes`] - axum handlers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
pub mod sync;
