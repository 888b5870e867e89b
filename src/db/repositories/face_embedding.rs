use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};

use crate::db::timestamp_now;
use crate::entities::{face_embeddings, prelude::*};
use crate::models::embedding::FaceEmbedding;

pub struct FaceEmbeddingRepository {
    conn: DatabaseConnection,
}

impl FaceEmbeddingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn find_model(&self, user_id: &str) -> Result<Option<face_embeddings::Model>> {
        FaceEmbeddings::find()
            .filter(face_embeddings::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query face embedding")
    }

    pub async fn get_by_user(&self, user_id: &str) -> Result<Option<FaceEmbedding>> {
        Ok(self.find_model(user_id).await?.map(FaceEmbedding::from))
    }

    async fn replace(&self, model: face_embeddings::Model, embedding: &str) -> Result<FaceEmbedding> {
        let mut active: face_embeddings::ActiveModel = model.into();
        active.embedding = Set(embedding.to_string());
        active.updated_at = Set(timestamp_now());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update face embedding")?;
        Ok(FaceEmbedding::from(model))
    }

    /// Creates or replaces the user's single embedding.
    pub async fn upsert(&self, user_id: &str, embedding: &str) -> Result<FaceEmbedding> {
        if let Some(existing) = self.find_model(user_id).await? {
            return self.replace(existing, embedding).await;
        }

        let now = timestamp_now();
        let active = face_embeddings::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            embedding: Set(embedding.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(FaceEmbedding::from(model)),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let existing = self
                    .find_model(user_id)
                    .await?
                    .context("Face embedding disappeared after conflict")?;
                self.replace(existing, embedding).await
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to insert face embedding")),
        }
    }

    pub async fn delete_by_user(&self, user_id: &str) -> Result<bool> {
        let res = FaceEmbeddings::delete_many()
            .filter(face_embeddings::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete face embedding")?;

        Ok(res.rows_affected > 0)
    }
}
