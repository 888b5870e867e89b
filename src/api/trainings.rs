use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::models::training::Training;
use crate::services::TrainingError;

impl From<TrainingError> for ApiError {
    fn from(err: TrainingError) -> Self {
        match err {
            TrainingError::NotFound => Self::NotFound(err.to_string()),
            TrainingError::Validation(msg) => Self::ValidationError(msg),
            TrainingError::Database(msg) => Self::DatabaseError(msg),
            TrainingError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrainingListQuery {
    pub category: Option<String>,
}

/// GET /trainings?category=
pub async fn list_trainings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrainingListQuery>,
) -> Result<Json<ApiResponse<Vec<Training>>>, ApiError> {
    let trainings = state
        .training_service()
        .list(query.category.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(trainings)))
}

/// GET /trainings/{id}
pub async fn get_training(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Training>>, ApiError> {
    let training = state.training_service().get(&id).await?;
    Ok(Json(ApiResponse::success(training)))
}
