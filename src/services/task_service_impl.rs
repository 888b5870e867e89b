use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::AccessConfig;
use crate::db::{Store, timestamp};
use crate::models::task::{Task, TaskChanges, TaskStatus};
use crate::services::task_service::{NewTaskInput, TaskError, TaskService, TaskUpdateInput};

fn parse_due_date(raw: &str) -> Result<String, TaskError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| timestamp(dt.with_timezone(&Utc)))
        .map_err(|_| TaskError::Validation(format!("Invalid due_date '{raw}', expected RFC3339")))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub struct SeaOrmTaskService {
    store: Store,
    access: AccessConfig,
}

impl SeaOrmTaskService {
    #[must_use]
    pub const fn new(store: Store, access: AccessConfig) -> Self {
        Self { store, access }
    }

    fn check_status(&self, status: &str) -> Result<(), TaskError> {
        if self.access.strict_task_status {
            status.parse::<TaskStatus>().map_err(TaskError::Validation)?;
        }
        Ok(())
    }

    /// Loads a task, hiding other users' tasks when ownership is enforced.
    async fn load(&self, user_id: &str, task_id: &str) -> Result<Task, TaskError> {
        let task = self.store.get_task(task_id).await?.ok_or(TaskError::NotFound)?;
        if self.access.enforce_task_ownership && task.user_id != user_id {
            return Err(TaskError::NotFound);
        }
        Ok(task)
    }
}

#[async_trait]
impl TaskService for SeaOrmTaskService {
    async fn create(&self, user_id: &str, input: NewTaskInput) -> Result<Task, TaskError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(TaskError::Validation("Title is required".to_string()));
        }

        let due_date = input
            .due_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(parse_due_date)
            .transpose()?;

        let task = self
            .store
            .create_task(
                user_id,
                title,
                input.description.trim(),
                TaskStatus::Pending.as_str(),
                due_date,
            )
            .await?;

        info!(user_id, task_id = %task.id, "Task created");
        Ok(task)
    }

    async fn list(&self, user_id: &str, status: Option<&str>) -> Result<Vec<Task>, TaskError> {
        let status = status.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.store.list_tasks(user_id, status).await?)
    }

    async fn get(&self, user_id: &str, task_id: &str) -> Result<Task, TaskError> {
        self.load(user_id, task_id).await
    }

    async fn update(
        &self,
        user_id: &str,
        task_id: &str,
        input: TaskUpdateInput,
    ) -> Result<Task, TaskError> {
        let status = non_empty(input.status);
        if let Some(status) = &status {
            self.check_status(status)?;
        }

        let due_date = input
            .due_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(parse_due_date)
            .transpose()?;

        self.load(user_id, task_id).await?;

        let changes = TaskChanges {
            title: non_empty(input.title),
            description: non_empty(input.description),
            status,
            due_date,
        };

        self.store
            .update_task(task_id, changes)
            .await?
            .ok_or(TaskError::NotFound)
    }

    async fn delete(&self, user_id: &str, task_id: &str) -> Result<(), TaskError> {
        self.load(user_id, task_id).await?;

        if !self.store.delete_task(task_id).await? {
            return Err(TaskError::NotFound);
        }

        info!(user_id, task_id, "Task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_is_normalized_to_utc() {
        assert_eq!(
            parse_due_date("2025-03-01T17:00:00+07:00").unwrap(),
            "2025-03-01T10:00:00.000000Z"
        );
        assert!(matches!(
            parse_due_date("tomorrow"),
            Err(TaskError::Validation(_))
        ));
    }
}
