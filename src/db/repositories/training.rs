use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::timestamp_now;
use crate::entities::{prelude::*, trainings};
use crate::models::training::{NewTraining, Training};

pub struct TrainingRepository {
    conn: DatabaseConnection,
}

impl TrainingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Training>> {
        let mut query = Trainings::find();
        if let Some(category) = category {
            query = query.filter(trainings::Column::Category.eq(category));
        }

        let rows = query
            .order_by_desc(trainings::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list trainings")?;

        Ok(rows.into_iter().map(Training::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Training>> {
        let row = Trainings::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query training")?;

        Ok(row.map(Training::from))
    }

    pub async fn create(&self, training: NewTraining) -> Result<Training> {
        let now = timestamp_now();
        let active = trainings::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            title: Set(training.title),
            description: Set(training.description),
            category: Set(training.category),
            duration: Set(training.duration),
            image_url: Set(training.image_url),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert training")?;
        Ok(Training::from(model))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let res = Trainings::delete_by_id(id.to_string())
            .exec(&self.conn)
            .await
            .context("Failed to delete training")?;

        Ok(res.rows_affected > 0)
    }
}
