//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Services
//! GET  /services               - List services (newest first)
//! POST /services               - Create a service
//! GET  /services/{id}          - Load one service
//! POST /services/{id}          - intent=update (default) | intent=delete
//! POST /services/{id}/delete   - Delete a service
//!
//! # Metaobject sync
//! GET  /sync                   - Definition status and service count
//! POST /sync                   - intent=definition | intent=backfill
//! ```
//!
//! Mutations answer with a `303` redirect once the local write commits,
//! whatever happened remotely; the redirect's `sync` query parameter tells
//! the UI whether the mirror succeeded. Rejected input is echoed back as
//! [`ActionData`].

pub mod services;
pub mod sync;

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::models::ValidationError;
use crate::state::AppState;

/// Build the router for all app routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(services::index).post(services::create))
        .route("/services/{id}", get(services::show).post(services::action))
        .route("/services/{id}/delete", post(services::destroy))
        .route("/sync", get(sync::status).post(sync::action))
}

/// Values echoed back to the form after a rejected submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Structured result of a form action that did not redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionData {
    /// Field name (or `form`) to message.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<&'static str, String>,
    pub values: FormValues,
}

impl ActionData {
    /// A field-level validation failure.
    #[must_use]
    pub fn invalid(error: &ValidationError, values: FormValues) -> Self {
        Self {
            errors: BTreeMap::from([(error.field, error.message.clone())]),
            values,
        }
    }

    /// A form-level failure (e.g. the store was unavailable).
    #[must_use]
    pub fn form_error(message: &str, values: FormValues) -> Self {
        Self {
            errors: BTreeMap::from([("form", message.to_string())]),
            values,
        }
    }

    /// Respond with this data and `status`.
    pub fn respond(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}
