//! Domain service for profile maintenance.

use thiserror::Error;

use crate::clients::assets::AssetError;
use crate::models::photo::Photo;
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("Photo upload failed: {0}")]
    Upload(#[from] AssetError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Partial update: an empty string leaves the field unchanged.
    async fn update_profile(
        &self,
        user_id: &str,
        name: &str,
        position: &str,
    ) -> Result<User, UserError>;

    /// # Errors
    ///
    /// Returns [`UserError::IncorrectPassword`] if `old_password` does not match.
    async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), UserError>;

    /// Stores the photo and records its URL on the user.
    async fn upload_profile_photo(&self, user_id: &str, photo: Photo) -> Result<User, UserError>;
}
