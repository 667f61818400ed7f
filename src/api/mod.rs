//! HTTP surface of the in-memory task store.

pub mod error;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{post, put};
use axum::{Json, Router, http::StatusCode, routing::get};
use tracing::info;

use crate::models::{NewTaskRequest, TaskId, UpdateTaskRequest};
use crate::store::MemoryTaskStore;
use crate::store::dto::{TaskListResponse, TaskResponse};

pub use error::ApiError;

#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<MemoryTaskStore>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks/", get(list_tasks).post(create_task))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
        .route("/tasks/{id}/acknowledge", post(acknowledge_task))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_tasks(State(state): State<ServerState>) -> Json<TaskListResponse> {
    Json(TaskListResponse {
        tasks: state.store.list(),
    })
}

async fn create_task(
    State(state): State<ServerState>,
    body: Result<Json<NewTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let Json(req) = body?;
    let task = state.store.create(req);
    Ok((StatusCode::CREATED, Json(TaskResponse { task })))
}

async fn update_task(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(req) = body?;
    let id = TaskId(id);
    let task = state
        .store
        .update(&id, req)
        .ok_or(ApiError::NotFound(id))?;
    Ok(Json(TaskResponse { task }))
}

async fn delete_task(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = TaskId(id);
    if state.store.delete(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(id))
    }
}

async fn acknowledge_task(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = TaskId(id);
    let task = state
        .store
        .acknowledge(&id)
        .ok_or(ApiError::NotFound(id))?;
    info!("acknowledged task {}", task.id);
    Ok(Json(TaskResponse { task }))
}
