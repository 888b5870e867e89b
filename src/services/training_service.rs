//! Read-only training catalog. Entries are created out-of-band through the CLI.

use async_trait::async_trait;
use thiserror::Error;

use crate::db::Store;
use crate::models::training::{NewTraining, Training};

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Training not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for TrainingError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for TrainingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait]
pub trait TrainingService: Send + Sync {
    async fn list(&self, category: Option<&str>) -> Result<Vec<Training>, TrainingError>;

    async fn get(&self, id: &str) -> Result<Training, TrainingError>;

    async fn create(&self, training: NewTraining) -> Result<Training, TrainingError>;

    async fn remove(&self, id: &str) -> Result<(), TrainingError>;
}

pub struct SeaOrmTrainingService {
    store: Store,
}

impl SeaOrmTrainingService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TrainingService for SeaOrmTrainingService {
    async fn list(&self, category: Option<&str>) -> Result<Vec<Training>, TrainingError> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        Ok(self.store.list_trainings(category).await?)
    }

    async fn get(&self, id: &str) -> Result<Training, TrainingError> {
        self.store
            .get_training(id)
            .await?
            .ok_or(TrainingError::NotFound)
    }

    async fn create(&self, mut training: NewTraining) -> Result<Training, TrainingError> {
        training.title = training.title.trim().to_string();
        if training.title.is_empty() {
            return Err(TrainingError::Validation("Title is required".to_string()));
        }
        if training.duration < 0 {
            return Err(TrainingError::Validation(
                "Duration must not be negative".to_string(),
            ));
        }

        Ok(self.store.create_training(training).await?)
    }

    async fn remove(&self, id: &str) -> Result<(), TrainingError> {
        if self.store.delete_training(id).await? {
            Ok(())
        } else {
            Err(TrainingError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn catalog_filters_by_category() {
        let service = SeaOrmTrainingService::new(Store::new("sqlite::memory:").await.unwrap());

        service
            .create(NewTraining {
                title: "Fire safety".into(),
                category: "safety".into(),
                duration: 30,
                ..NewTraining::default()
            })
            .await
            .unwrap();
        let onboarding = service
            .create(NewTraining {
                title: "Welcome".into(),
                category: "onboarding".into(),
                duration: 60,
                ..NewTraining::default()
            })
            .await
            .unwrap();

        assert_eq!(service.list(None).await.unwrap().len(), 2);
        let safety = service.list(Some("safety")).await.unwrap();
        assert_eq!(safety.len(), 1);
        assert_eq!(safety[0].title, "Fire safety");

        assert_eq!(service.get(&onboarding.id).await.unwrap().duration, 60);
        service.remove(&onboarding.id).await.unwrap();
        assert!(matches!(
            service.get(&onboarding.id).await,
            Err(TrainingError::NotFound)
        ));
    }

    #[tokio::test]
    async fn title_is_required() {
        let service = SeaOrmTrainingService::new(Store::new("sqlite::memory:").await.unwrap());
        let err = service
            .create(NewTraining {
                title: "  ".into(),
                ..NewTraining::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TrainingError::Validation(_)));
    }
}
