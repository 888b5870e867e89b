use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::tasks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!(
                "invalid status '{other}', expected pending, in_progress or completed"
            )),
        }
    }
}

/// Status is kept as text: lenient deployments may store values outside [`TaskStatus`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<tasks::Model> for Task {
    fn from(model: tasks::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            status: model.status,
            due_date: model.due_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values() {
        assert_eq!("pending".parse::<TaskStatus>(), Ok(TaskStatus::Pending));
        assert_eq!(
            "in_progress".parse::<TaskStatus>(),
            Ok(TaskStatus::InProgress)
        );
        assert_eq!("completed".parse::<TaskStatus>(), Ok(TaskStatus::Completed));
        assert!("done".parse::<TaskStatus>().is_err());
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
    }
}
