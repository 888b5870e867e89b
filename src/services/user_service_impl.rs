use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::clients::assets::AssetStore;
use crate::config::SecurityConfig;
use crate::db::Store;
use crate::models::photo::Photo;
use crate::models::user::User;
use crate::services::auth_service_impl::{hash_blocking, validate_password, verify_blocking};
use crate::services::user_service::{UserError, UserService};

const PROFILE_FOLDER: &str = "profile";

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
    assets: Arc<dyn AssetStore>,
}

impl SeaOrmUserService {
    #[must_use]
    pub fn new(store: Store, security: SecurityConfig, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            store,
            security,
            assets,
        }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn update_profile(
        &self,
        user_id: &str,
        name: &str,
        position: &str,
    ) -> Result<User, UserError> {
        self.store
            .update_profile(user_id, non_empty(name), non_empty(position))
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), UserError> {
        validate_password(new_password).map_err(UserError::Validation)?;

        let current_hash = self
            .store
            .get_password_hash(user_id)
            .await?
            .ok_or(UserError::NotFound)?;

        if !verify_blocking(old_password, &current_hash).await? {
            return Err(UserError::IncorrectPassword);
        }

        let new_hash = hash_blocking(new_password, &self.security).await?;
        if !self.store.update_password_hash(user_id, new_hash).await? {
            return Err(UserError::NotFound);
        }

        info!(user_id, "Password changed");
        Ok(())
    }

    async fn upload_profile_photo(&self, user_id: &str, photo: Photo) -> Result<User, UserError> {
        if photo.is_empty() {
            return Err(UserError::Validation("Photo is empty".to_string()));
        }
        if self.store.get_user(user_id).await?.is_none() {
            return Err(UserError::NotFound);
        }

        let url = self.assets.upload(&photo, PROFILE_FOLDER).await?;

        let user = self
            .store
            .set_profile_photo(user_id, &url)
            .await?
            .ok_or(UserError::NotFound)?;

        info!(user_id, url = %url, "Profile photo updated");
        Ok(user)
    }
}
