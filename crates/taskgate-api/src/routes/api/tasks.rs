//! Task routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use taskgate_db::{NewTask, UpdateTask};
use tracing::{debug, info};

use crate::error::{ApiError, ApiJson, ApiPath};
use crate::state::AppState;

use super::auth::CurrentUser;
use super::types::{CreateTaskRequest, MessageResponse, TaskResponse, UpdateTaskRequest};
use super::validation::validate_title;

/// GET /api/tasks
async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.store.list_tasks().await?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// POST /api/tasks
async fn create_task(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    validate_title(&request.title)?;

    debug!("User {} creating task for user {}", user.username, request.user_id);

    let task = state
        .store
        .insert_task(NewTask {
            title: request.title,
            done: request.done,
            user_id: request.user_id,
        })
        .await?;

    info!("Created task {}", task.id);

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// GET /api/tasks/{id}
async fn get_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state
        .store
        .get_task(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task: {}", id)))?;

    Ok(Json(TaskResponse::from(task)))
}

/// PUT /api/tasks/{id}
async fn update_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    if let Some(title) = &request.title {
        validate_title(title)?;
    }

    debug!("Updating task: {}", id);

    let task = state
        .store
        .update_task(
            id,
            UpdateTask {
                title: request.title,
                done: request.done,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task: {}", id)))?;

    Ok(Json(TaskResponse::from(task)))
}

/// DELETE /api/tasks/{id}
async fn delete_task(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!("Deleting task: {}", id);

    if state.store.delete_task(id).await? {
        info!("Deleted task: {}", id);
        Ok(Json(MessageResponse::new("Task deleted successfully")))
    } else {
        Err(ApiError::NotFound(format!("Task: {}", id)))
    }
}

/// Create task routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}
