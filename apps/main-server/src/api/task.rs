//! Task endpoints.
//!
//! Tasks use the generic CRUD handlers except for the single-item GET,
//! which returns the task with its status and task type embedded.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use entities::{Task, TaskDetail};
use task_store::{Record, TaskStore};
use uuid::Uuid;

use crate::api::resource;
use crate::error::{ServerError, ServerResult};
use crate::extract::PathParam;
use crate::state::AppState;

/// Routes under `/tasks`.
pub fn routes<S: TaskStore + 'static>() -> Router<Arc<AppState<S>>> {
    resource::routes_with::<S, Task>("/tasks", get(get_task::<S>))
}

/// Gets a task by ID with its status and task type.
pub async fn get_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    PathParam(id): PathParam<Uuid>,
) -> ServerResult<Json<TaskDetail>> {
    let detail = state
        .store
        .get_task_detail(id)
        .await?
        .ok_or_else(|| ServerError::not_found(Task::ENTITY))?;

    Ok(Json(detail))
}
