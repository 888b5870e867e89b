use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::attendance::{Attendance, Punch};
use crate::models::embedding::FaceEmbedding;
use crate::models::task::{Task, TaskChanges};
use crate::models::training::{NewTraining, Training};
use crate::models::user::{NewUser, User};

pub mod migrator;
pub mod repositories;

pub use repositories::attendance::DayInsert;
pub use repositories::user::{InsertUserError, UniqueField};

/// Stored timestamps are fixed-width RFC3339 in UTC so they sort lexically.
#[must_use]
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[must_use]
pub fn timestamp_now() -> String {
    timestamp(Utc::now())
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        // Every connection to an in-memory sqlite database is a separate database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn attendance_repo(&self) -> repositories::attendance::AttendanceRepository {
        repositories::attendance::AttendanceRepository::new(self.conn.clone())
    }

    fn task_repo(&self) -> repositories::task::TaskRepository {
        repositories::task::TaskRepository::new(self.conn.clone())
    }

    fn training_repo(&self) -> repositories::training::TrainingRepository {
        repositories::training::TrainingRepository::new(self.conn.clone())
    }

    fn embedding_repo(&self) -> repositories::face_embedding::FaceEmbeddingRepository {
        repositories::face_embedding::FaceEmbeddingRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn get_password_hash(&self, user_id: &str) -> Result<Option<String>> {
        self.user_repo().get_password_hash(user_id).await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn employee_id_exists(&self, employee_id: &str) -> Result<bool> {
        self.user_repo().employee_id_exists(employee_id).await
    }

    pub async fn insert_user(&self, user: NewUser) -> Result<User, InsertUserError> {
        self.user_repo().insert(user).await
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        name: Option<String>,
        position: Option<String>,
    ) -> Result<Option<User>> {
        self.user_repo()
            .update_profile(user_id, name, position)
            .await
    }

    pub async fn update_password_hash(&self, user_id: &str, password_hash: String) -> Result<bool> {
        self.user_repo()
            .update_password_hash(user_id, password_hash)
            .await
    }

    pub async fn set_profile_photo(&self, user_id: &str, url: &str) -> Result<Option<User>> {
        self.user_repo().set_profile_photo(user_id, url).await
    }

    pub async fn set_face_embedding_id(
        &self,
        user_id: &str,
        embedding_id: Option<String>,
    ) -> Result<()> {
        self.user_repo()
            .set_face_embedding_id(user_id, embedding_id)
            .await
    }

    // ========================================================================
    // Attendance
    // ========================================================================

    pub async fn attendance_for_day(
        &self,
        user_id: &str,
        work_date: &str,
    ) -> Result<Option<Attendance>> {
        self.attendance_repo()
            .find_for_day(user_id, work_date)
            .await
    }

    pub async fn insert_clock_in(
        &self,
        user_id: &str,
        work_date: &str,
        punch: &Punch,
    ) -> Result<DayInsert> {
        self.attendance_repo()
            .insert_clock_in(user_id, work_date, punch)
            .await
    }

    pub async fn update_clock_in(
        &self,
        user_id: &str,
        work_date: &str,
        punch: &Punch,
    ) -> Result<Option<Attendance>> {
        self.attendance_repo()
            .update_clock_in(user_id, work_date, punch)
            .await
    }

    pub async fn update_clock_out(
        &self,
        user_id: &str,
        work_date: &str,
        punch: &Punch,
    ) -> Result<Option<Attendance>> {
        self.attendance_repo()
            .update_clock_out(user_id, work_date, punch)
            .await
    }

    pub async fn attendance_history(
        &self,
        user_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<Attendance>> {
        self.attendance_repo().history(user_id, start, end).await
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    pub async fn create_task(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
        status: &str,
        due_date: Option<String>,
    ) -> Result<Task> {
        self.task_repo()
            .create(user_id, title, description, status, due_date)
            .await
    }

    pub async fn get_task(&self, id: &str) -> Result<Option<Task>> {
        self.task_repo().get(id).await
    }

    pub async fn list_tasks(&self, user_id: &str, status: Option<&str>) -> Result<Vec<Task>> {
        self.task_repo().list_for_user(user_id, status).await
    }

    pub async fn update_task(&self, id: &str, changes: TaskChanges) -> Result<Option<Task>> {
        self.task_repo().update(id, changes).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<bool> {
        self.task_repo().soft_delete(id).await
    }

    // ========================================================================
    // Trainings
    // ========================================================================

    pub async fn list_trainings(&self, category: Option<&str>) -> Result<Vec<Training>> {
        self.training_repo().list(category).await
    }

    pub async fn get_training(&self, id: &str) -> Result<Option<Training>> {
        self.training_repo().get(id).await
    }

    pub async fn create_training(&self, training: NewTraining) -> Result<Training> {
        self.training_repo().create(training).await
    }

    pub async fn delete_training(&self, id: &str) -> Result<bool> {
        self.training_repo().delete(id).await
    }

    // ========================================================================
    // Face embeddings
    // ========================================================================

    pub async fn upsert_embedding(&self, user_id: &str, embedding: &str) -> Result<FaceEmbedding> {
        self.embedding_repo().upsert(user_id, embedding).await
    }

    pub async fn get_embedding(&self, user_id: &str) -> Result<Option<FaceEmbedding>> {
        self.embedding_repo().get_by_user(user_id).await
    }

    pub async fn delete_embedding(&self, user_id: &str) -> Result<bool> {
        self.embedding_repo().delete_by_user(user_id).await
    }
}
