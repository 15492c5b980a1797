//! Metaobject sync route handlers.

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::shopify::metaobjects::MetaobjectDefinition;
use crate::state::AppState;
use crate::sync::{SERVICE_METAOBJECT_TYPE, backfill_all, ensure_definition, find_definition};

/// Sync page data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub metaobject_type: &'static str,
    /// The shop's definition, if it exists yet.
    pub definition: Option<MetaobjectDefinition>,
    pub service_count: i64,
}

/// Form input for the sync page.
#[derive(Debug, Deserialize)]
pub struct SyncForm {
    #[serde(default)]
    pub intent: String,
}

/// Sync page loader.
#[instrument(skip(state))]
pub async fn status(State(state): State<AppState>) -> Result<Json<SyncStatus>, AppError> {
    let service_count = state.services().count().await?;
    let definition = find_definition(state.shopify()).await?;

    Ok(Json(SyncStatus {
        metaobject_type: SERVICE_METAOBJECT_TYPE,
        definition,
        service_count,
    }))
}

/// Sync page action (`intent=definition|backfill`).
#[instrument(skip(state))]
pub async fn action(
    State(state): State<AppState>,
    Form(form): Form<SyncForm>,
) -> Result<Response, AppError> {
    match form.intent.as_str() {
        "definition" => {
            let definition = ensure_definition(state.shopify()).await?;
            Ok(Json(definition).into_response())
        }
        "backfill" => {
            let store = state.services();
            let report =
                backfill_all(&store, state.shopify(), &state.sync_config().backfill).await;
            let status = if report.fatal.is_some() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::OK
            };
            Ok((status, Json(report)).into_response())
        }
        other => Err(AppError::BadRequest(format!("unknown intent `{other}`"))),
    }
}
