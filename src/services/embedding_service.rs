//! Face embedding references, written by the recognition service.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::db::Store;
use crate::models::embedding::FaceEmbedding;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("User not found")]
    UserNotFound,

    #[error("Face embedding not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for EmbeddingError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for EmbeddingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Creates or replaces the user's embedding and links it from the user row.
    async fn save(&self, user_id: &str, embedding: &str) -> Result<FaceEmbedding, EmbeddingError>;

    async fn get(&self, user_id: &str) -> Result<FaceEmbedding, EmbeddingError>;

    async fn delete(&self, user_id: &str) -> Result<(), EmbeddingError>;
}

pub struct SeaOrmEmbeddingService {
    store: Store,
}

impl SeaOrmEmbeddingService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EmbeddingService for SeaOrmEmbeddingService {
    async fn save(&self, user_id: &str, embedding: &str) -> Result<FaceEmbedding, EmbeddingError> {
        if user_id.trim().is_empty() {
            return Err(EmbeddingError::Validation("user_id is required".to_string()));
        }
        if embedding.trim().is_empty() {
            return Err(EmbeddingError::Validation(
                "embedding is required".to_string(),
            ));
        }
        if self.store.get_user(user_id).await?.is_none() {
            return Err(EmbeddingError::UserNotFound);
        }

        let saved = self.store.upsert_embedding(user_id, embedding).await?;
        self.store
            .set_face_embedding_id(user_id, Some(saved.id.clone()))
            .await?;

        info!(user_id, embedding_id = %saved.id, "Face embedding saved");
        Ok(saved)
    }

    async fn get(&self, user_id: &str) -> Result<FaceEmbedding, EmbeddingError> {
        self.store
            .get_embedding(user_id)
            .await?
            .ok_or(EmbeddingError::NotFound)
    }

    async fn delete(&self, user_id: &str) -> Result<(), EmbeddingError> {
        if !self.store.delete_embedding(user_id).await? {
            return Err(EmbeddingError::NotFound);
        }
        self.store.set_face_embedding_id(user_id, None).await?;

        info!(user_id, "Face embedding deleted");
        Ok(())
    }
}
