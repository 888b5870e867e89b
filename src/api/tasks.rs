use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::task::Task;
use crate::services::{NewTaskInput, TaskError, TaskUpdateInput};

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound => Self::NotFound(err.to_string()),
            TaskError::Validation(msg) => Self::ValidationError(msg),
            TaskError::Database(msg) => Self::DatabaseError(msg),
            TaskError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<String>,
}

/// POST /tasks
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(payload): Json<NewTaskInput>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let task = state.task_service().create(&user_id, payload).await?;
    Ok(Json(ApiResponse::success(task)))
}

/// GET /tasks?status=
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = state
        .task_service()
        .list(&user_id, query.status.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(tasks)))
}

/// GET /tasks/{id}
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let task = state.task_service().get(&user_id, &id).await?;
    Ok(Json(ApiResponse::success(task)))
}

/// PUT /tasks/{id}
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<TaskUpdateInput>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let task = state.task_service().update(&user_id, &id, payload).await?;
    Ok(Json(ApiResponse::success(task)))
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.task_service().delete(&user_id, &id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Task deleted"))))
}
