//! Generic CRUD endpoints shared by every entity.
//!
//! Each handler is generic over the store `S` and the record type `R`;
//! [`routes`] instantiates the full set for one entity under a collection
//! prefix.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{MethodRouter, get},
};
use entities::Validate;
use serde::Serialize;
use task_store::{Page, Record, TaskStore, TaskStoreError};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::extract::{PathParam, Payload, QueryParams};
use crate::state::AppState;

/// Response body for a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

/// Routes for one entity, with the generic single-item GET.
pub fn routes<S: TaskStore + 'static, R: Record>(prefix: &str) -> Router<Arc<AppState<S>>> {
    routes_with::<S, R>(prefix, get(get_record::<S, R>))
}

/// Routes for one entity, with a custom single-item GET.
///
/// The collection is served at both `{prefix}` and `{prefix}/`; items at
/// `{prefix}/:id`.
pub fn routes_with<S: TaskStore + 'static, R: Record>(
    prefix: &str,
    get_one: MethodRouter<Arc<AppState<S>>>,
) -> Router<Arc<AppState<S>>> {
    let collection = get(list_records::<S, R>).post(create_record::<S, R>);
    let item = get_one
        .patch(update_record::<S, R>)
        .delete(delete_record::<S, R>);

    Router::new()
        .route(&format!("{prefix}/"), collection.clone())
        .route(prefix, collection)
        .route(&format!("{prefix}/:id"), item)
}

/// Lists records.
pub async fn list_records<S: TaskStore, R: Record>(
    State(state): State<Arc<AppState<S>>>,
    QueryParams(page): QueryParams<Page>,
) -> ServerResult<Json<Vec<R>>> {
    let records = state.store.list::<R>(page).await?;
    Ok(Json(records))
}

/// Gets a record by ID.
pub async fn get_record<S: TaskStore, R: Record>(
    State(state): State<Arc<AppState<S>>>,
    PathParam(id): PathParam<Uuid>,
) -> ServerResult<Json<R>> {
    let record = state
        .store
        .get::<R>(id)
        .await?
        .ok_or_else(|| ServerError::not_found(R::ENTITY))?;

    Ok(Json(record))
}

/// Creates a record.
pub async fn create_record<S: TaskStore, R: Record>(
    State(state): State<Arc<AppState<S>>>,
    Payload(input): Payload<R::Create>,
) -> ServerResult<Json<R>> {
    input.validate()?;

    let record = state.store.create::<R>(input).await?;

    tracing::info!(entity = R::ENTITY, id = %record.id(), "Record created");

    Ok(Json(record))
}

/// Applies a partial update to a record.
pub async fn update_record<S: TaskStore, R: Record>(
    State(state): State<Arc<AppState<S>>>,
    PathParam(id): PathParam<Uuid>,
    Payload(patch): Payload<R::Patch>,
) -> ServerResult<Json<R>> {
    patch.validate()?;

    let record = state.store.update::<R>(id, patch).await?;

    tracing::info!(entity = R::ENTITY, id = %id, "Record updated");

    Ok(Json(record))
}

/// Deletes a record.
pub async fn delete_record<S: TaskStore, R: Record>(
    State(state): State<Arc<AppState<S>>>,
    PathParam(id): PathParam<Uuid>,
) -> ServerResult<Json<DeleteResponse>> {
    state.store.delete::<R>(id).await.inspect_err(|err| {
        if let TaskStoreError::InUse { referenced_by, .. } = err {
            tracing::warn!(entity = R::ENTITY, id = %id, referenced_by = *referenced_by, "Delete rejected");
        }
    })?;

    tracing::info!(entity = R::ENTITY, id = %id, "Record deleted");

    Ok(Json(DeleteResponse { ok: true }))
}
