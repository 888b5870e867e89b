use serde::{Deserialize, Serialize};

use crate::entities::trainings;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Training {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration: i32,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<trainings::Model> for Training {
    fn from(model: trainings::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            category: model.category,
            duration: model.duration,
            image_url: model.image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTraining {
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration: i32,
    pub image_url: Option<String>,
}
