//! API endpoints.

pub mod resource;
pub mod task;

use std::sync::Arc;

use axum::{Router, routing::get};
use entities::{Status, TaskType};
use task_store::TaskStore;

use crate::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router<S: TaskStore + 'static>() -> Router<Arc<AppState<S>>> {
    Router::new()
        // Status endpoints
        .merge(resource::routes::<S, Status>("/statuses"))
        // Type endpoints
        .merge(resource::routes::<S, TaskType>("/types"))
        // Task endpoints
        .merge(task::routes::<S>())
        // Health check
        .route("/health", get(health_check))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
