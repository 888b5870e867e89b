//! Endpoints called by the face recognition service, not by end users.

use axum::{
    Json,
    extract::{Path, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, EmbeddingResponse, EmbeddingSavedResponse, MessageResponse,
};
use crate::services::EmbeddingError;

impl From<EmbeddingError> for ApiError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::UserNotFound | EmbeddingError::NotFound => {
                Self::NotFound(err.to_string())
            }
            EmbeddingError::Validation(msg) => Self::ValidationError(msg),
            EmbeddingError::Database(msg) => Self::DatabaseError(msg),
            EmbeddingError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveEmbeddingRequest {
    #[serde(default)]
    pub user_id: String,
    /// Either an already-serialized string or a raw JSON array.
    #[serde(default)]
    pub embedding: Value,
}

fn embedding_text(value: Value) -> Result<String, ApiError> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s),
        Value::Array(_) => Ok(value.to_string()),
        _ => Err(ApiError::validation("embedding is required")),
    }
}

/// Checks `X-Api-Key` when `access.embedding_api_key` is configured. Open otherwise.
pub async fn embedding_key_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.config().access.embedding_api_key.as_deref()
        && !expected.is_empty()
    {
        let provided = headers.get("X-Api-Key").and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            return Err(ApiError::unauthorized("Invalid API key"));
        }
    }

    Ok(next.run(request).await)
}

/// POST /embeddings
pub async fn save_embedding(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveEmbeddingRequest>,
) -> Result<Json<ApiResponse<EmbeddingSavedResponse>>, ApiError> {
    let embedding = embedding_text(payload.embedding)?;
    let saved = state
        .embedding_service()
        .save(payload.user_id.trim(), &embedding)
        .await?;

    Ok(Json(ApiResponse::success(EmbeddingSavedResponse {
        message: "Face embedding saved".to_string(),
        embedding_id: saved.id,
    })))
}

/// GET /embeddings/user/{user_id}
pub async fn get_embedding(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<EmbeddingResponse>>, ApiError> {
    let embedding = state.embedding_service().get(&user_id).await?;

    Ok(Json(ApiResponse::success(EmbeddingResponse {
        user_id: embedding.user_id,
        embedding: embedding.embedding,
    })))
}

/// DELETE /embeddings/user/{user_id}
pub async fn delete_embedding(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.embedding_service().delete(&user_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Face embedding deleted",
    ))))
}
