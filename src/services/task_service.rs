//! Domain service for personal to-do items.

use serde::Deserialize;
use thiserror::Error;

use crate::models::task::Task;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for TaskError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTaskInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// RFC3339
    pub due_date: Option<String>,
}

/// Fields to change. Empty strings mean "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdateInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    /// RFC3339
    pub due_date: Option<String>,
}

#[async_trait::async_trait]
pub trait TaskService: Send + Sync {
    async fn create(&self, user_id: &str, input: NewTaskInput) -> Result<Task, TaskError>;

    /// The caller's tasks, newest first, optionally filtered by status.
    async fn list(&self, user_id: &str, status: Option<&str>) -> Result<Vec<Task>, TaskError>;

    async fn get(&self, user_id: &str, task_id: &str) -> Result<Task, TaskError>;

    async fn update(
        &self,
        user_id: &str,
        task_id: &str,
        input: TaskUpdateInput,
    ) -> Result<Task, TaskError>;

    async fn delete(&self, user_id: &str, task_id: &str) -> Result<(), TaskError>;
}
