use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::timestamp_now;
use crate::entities::{prelude::*, tasks};
use crate::models::task::{Task, TaskChanges};

pub struct TaskRepository {
    conn: DatabaseConnection,
}

impl TaskRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn find_live(&self, id: &str) -> Result<Option<tasks::Model>> {
        Tasks::find_by_id(id.to_string())
            .filter(tasks::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query task")
    }

    pub async fn create(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
        status: &str,
        due_date: Option<String>,
    ) -> Result<Task> {
        let now = timestamp_now();
        let active = tasks::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            title: Set(title.to_string()),
            description: Set(description.to_string()),
            status: Set(status.to_string()),
            due_date: Set(due_date),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert task")?;
        Ok(Task::from(model))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.find_live(id).await?.map(Task::from))
    }

    pub async fn list_for_user(&self, user_id: &str, status: Option<&str>) -> Result<Vec<Task>> {
        let mut query = Tasks::find()
            .filter(tasks::Column::UserId.eq(user_id))
            .filter(tasks::Column::DeletedAt.is_null());

        if let Some(status) = status {
            query = query.filter(tasks::Column::Status.eq(status));
        }

        let rows = query
            .order_by_desc(tasks::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list tasks")?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    pub async fn update(&self, id: &str, changes: TaskChanges) -> Result<Option<Task>> {
        let Some(model) = self.find_live(id).await? else {
            return Ok(None);
        };

        let mut active: tasks::ActiveModel = model.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        if let Some(due_date) = changes.due_date {
            active.due_date = Set(Some(due_date));
        }
        active.updated_at = Set(timestamp_now());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update task")?;
        Ok(Some(Task::from(model)))
    }

    /// Marks the task deleted. Returns `false` if it did not exist or was already deleted.
    pub async fn soft_delete(&self, id: &str) -> Result<bool> {
        let Some(model) = self.find_live(id).await? else {
            return Ok(false);
        };

        let now = timestamp_now();
        let mut active: tasks::ActiveModel = model.into();
        active.deleted_at = Set(Some(now.clone()));
        active.updated_at = Set(now);
        active
            .update(&self.conn)
            .await
            .context("Failed to delete task")?;

        Ok(true)
    }
}
