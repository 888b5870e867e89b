use serde::{Deserialize, Serialize};

use crate::entities::face_embeddings;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaceEmbedding {
    pub id: String,
    pub user_id: String,
    pub embedding: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<face_embeddings::Model> for FaceEmbedding {
    fn from(model: face_embeddings::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            embedding: model.embedding,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
