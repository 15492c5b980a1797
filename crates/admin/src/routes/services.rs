//! Service CRUD route handlers.

use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;
use zoo_product_form_core::ServiceId;

use super::{ActionData, FormValues};
use crate::db::{RepositoryError, ServiceStore};
use crate::error::AppError;
use crate::models::{Service, ServiceDraft, ValidationError};
use crate::services::{create_service, delete_service, update_service};
use crate::state::AppState;
use crate::sync::{Committed, RemoteSyncResult};

const SAVE_FAILED: &str = "Could not save the service. Please try again.";
const DELETE_FAILED: &str = "Could not delete the service. Please try again.";

/// Form input for creating/updating services.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceForm {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// `update` or `delete` on multi-action routes.
    pub intent: Option<String>,
}

impl ServiceForm {
    fn draft(&self) -> Result<ServiceDraft, ValidationError> {
        ServiceDraft::new(
            &self.title,
            self.description.as_deref(),
            self.image_url.as_deref(),
        )
    }

    fn values(&self) -> FormValues {
        FormValues {
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Service list loader.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Service>>, AppError> {
    let services = state.services().list().await?;
    Ok(Json(services))
}

/// Single service loader.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Service>, AppError> {
    match state.services().get(ServiceId::new(id)).await {
        Ok(service) => Ok(Json(service)),
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("service {id}"))),
        Err(e) => Err(e.into()),
    }
}

/// Create service action.
#[instrument(skip(state, form))]
pub async fn create(State(state): State<AppState>, Form(form): Form<ServiceForm>) -> Response {
    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(e) => return ActionData::invalid(&e, form.values()).respond(StatusCode::UNPROCESSABLE_ENTITY),
    };

    let store = state.services();
    let result = create_service(&store, state.shopify(), &state.sync_config().record, &draft).await;

    match result {
        Ok(committed) => redirect_to_service(&committed),
        Err(e) => save_failed(&e, form.values()),
    }
}

/// Multi-action route for an existing service (`intent=update|delete`).
#[instrument(skip(state, form))]
pub async fn action(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<ServiceForm>,
) -> Result<Response, AppError> {
    match form.intent.as_deref().unwrap_or("update") {
        "update" => update(&state, ServiceId::new(id), &form).await,
        "delete" => remove(&state, ServiceId::new(id)).await,
        other => Err(AppError::BadRequest(format!("unknown intent `{other}`"))),
    }
}

/// Delete service action.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    remove(&state, ServiceId::new(id)).await
}

async fn update(state: &AppState, id: ServiceId, form: &ServiceForm) -> Result<Response, AppError> {
    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(e) => {
            return Ok(ActionData::invalid(&e, form.values()).respond(StatusCode::UNPROCESSABLE_ENTITY));
        }
    };

    let store = state.services();
    match update_service(&store, state.shopify(), &state.sync_config().record, id, &draft).await {
        Ok(committed) => Ok(redirect_to_service(&committed)),
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("service {id}"))),
        Err(e) => Ok(save_failed(&e, form.values())),
    }
}

async fn remove(state: &AppState, id: ServiceId) -> Result<Response, AppError> {
    let store = state.services();
    match delete_service(&store, state.shopify(), &state.sync_config().record, id).await {
        Ok(committed) => Ok(redirect_to_list(&committed)),
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("service {id}"))),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete service");
            Ok(ActionData::form_error(DELETE_FAILED, FormValues::default())
                .respond(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

/// Redirect after a committed create or update.
fn redirect_to_service(committed: &Committed<Service>) -> Response {
    log_mirror(&committed.mirror);
    Redirect::to(&format!(
        "/services/{}?sync={}",
        committed.value.id,
        committed.mirror.notice()
    ))
    .into_response()
}

/// Redirect after a committed delete.
fn redirect_to_list(committed: &Committed<Service>) -> Response {
    log_mirror(&committed.mirror);
    Redirect::to(&format!("/services?sync={}", committed.mirror.notice())).into_response()
}

fn log_mirror(mirror: &RemoteSyncResult) {
    if !mirror.is_success() {
        tracing::warn!(
            reason = %mirror.failure_reason().unwrap_or_default(),
            "Saved locally, metaobject mirror did not succeed"
        );
    }
}

fn save_failed(error: &RepositoryError, values: FormValues) -> Response {
    tracing::error!(error = %error, "Failed to save service");
    ActionData::form_error(SAVE_FAILED, values).respond(StatusCode::INTERNAL_SERVER_ERROR)
}
