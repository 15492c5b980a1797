//! Domain models for the admin app.

pub mod service;

pub use service::{Service, ServiceDraft, ValidationError};
