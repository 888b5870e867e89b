use axum::{
    Extension, Json,
    extract::{Multipart, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::upload::PhotoForm;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::user::User;
use crate::services::UserError;

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => Self::NotFound(err.to_string()),
            UserError::Validation(msg) => Self::ValidationError(msg),
            UserError::IncorrectPassword => Self::ValidationError(err.to_string()),
            UserError::Upload(e) => Self::external("Photo storage", e.to_string()),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// PUT /user/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .user_service()
        .update_profile(&user_id, &payload.name, &payload.position)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// PUT /user/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.old_password.is_empty() {
        return Err(ApiError::validation("Old password is required"));
    }

    state
        .user_service()
        .change_password(&user_id, &payload.old_password, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// POST /user/upload-profile-photo
pub async fn upload_profile_photo(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let photo = PhotoForm::read(multipart).await?.require_photo()?;

    let user = state
        .user_service()
        .upload_profile_photo(&user_id, photo)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}
