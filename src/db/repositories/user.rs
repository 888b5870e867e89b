use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr,
};
use std::fmt;

use crate::config::SecurityConfig;
use crate::db::timestamp_now;
use crate::entities::users;
use crate::models::user::{NewUser, User};

/// Column guarded by a unique index on `users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    EmployeeId,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::EmployeeId => f.write_str("employee_id"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InsertUserError {
    #[error("unique constraint violated on users.{field}")]
    UniqueViolation { field: UniqueField },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DbErr> for InsertUserError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err()
            && let Some(field) = violated_field(&message)
        {
            return Self::UniqueViolation { field };
        }
        Self::Other(anyhow::Error::new(err).context("Failed to insert user"))
    }
}

/// Maps a driver message such as `UNIQUE constraint failed: users.email` to the column.
fn violated_field(message: &str) -> Option<UniqueField> {
    if message.contains("users.employee_id") || message.contains("idx_users_employee_id") {
        Some(UniqueField::EmployeeId)
    } else if message.contains("users.email") || message.contains("idx_users_email") {
        Some(UniqueField::Email)
    } else {
        None
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn find_active(&self, id: &str) -> Result<Option<users::Model>> {
        users::Entity::find_by_id(id.to_string())
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.find_active(id).await?.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Get user by email together with the stored password hash (for login)
    pub async fn get_by_email_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn get_password_hash(&self, id: &str) -> Result<Option<String>> {
        Ok(self.find_active(id).await?.map(|u| u.password_hash))
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to count users by email")?;

        Ok(count > 0)
    }

    pub async fn employee_id_exists(&self, employee_id: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::EmployeeId.eq(employee_id))
            .count(&self.conn)
            .await
            .context("Failed to count users by employee ID")?;

        Ok(count > 0)
    }

    pub async fn insert(&self, user: NewUser) -> Result<User, InsertUserError> {
        let now = timestamp_now();

        let active = users::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            employee_id: Set(user.employee_id),
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            position: Set(None),
            profile_photo_url: Set(None),
            company_id: Set(user.company_id),
            company_name: Set(user.company_name),
            face_embedding_id: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active.insert(&self.conn).await?;
        Ok(User::from(model))
    }

    /// Applies a partial profile update. `None` leaves the column untouched.
    pub async fn update_profile(
        &self,
        id: &str,
        name: Option<String>,
        position: Option<String>,
    ) -> Result<Option<User>> {
        let Some(user) = self.find_active(id).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(position) = position {
            active.position = Set(Some(position));
        }
        active.updated_at = Set(timestamp_now());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")?;
        Ok(Some(User::from(model)))
    }

    pub async fn update_password_hash(&self, id: &str, password_hash: String) -> Result<bool> {
        let Some(user) = self.find_active(id).await? else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(timestamp_now());
        active
            .update(&self.conn)
            .await
            .context("Failed to update password")?;

        Ok(true)
    }

    pub async fn set_profile_photo(&self, id: &str, url: &str) -> Result<Option<User>> {
        let Some(user) = self.find_active(id).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        active.profile_photo_url = Set(Some(url.to_string()));
        active.updated_at = Set(timestamp_now());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update profile photo")?;
        Ok(Some(User::from(model)))
    }

    pub async fn set_face_embedding_id(&self, id: &str, embedding_id: Option<String>) -> Result<()> {
        let Some(user) = self.find_active(id).await? else {
            return Ok(());
        };

        let mut active: users::ActiveModel = user.into();
        active.face_embedding_id = Set(embedding_id);
        active.updated_at = Set(timestamp_now());
        active
            .update(&self.conn)
            .await
            .context("Failed to update face embedding reference")?;

        Ok(())
    }
}

fn argon2_for(config: &SecurityConfig) -> Result<Argon2<'static>> {
    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password using Argon2id with the deployment's cost parameters.
/// CPU-heavy: call from `spawn_blocking`.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2_for(config)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Checks `password` against a PHC-encoded hash. Parameters are read from the hash itself.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn violated_field_reads_sqlite_messages() {
        assert_eq!(
            violated_field("UNIQUE constraint failed: users.email"),
            Some(UniqueField::Email)
        );
        assert_eq!(
            violated_field("UNIQUE constraint failed: users.employee_id"),
            Some(UniqueField::EmployeeId)
        );
        assert_eq!(violated_field("UNIQUE constraint failed: tasks.id"), None);
    }

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("hunter22", &cheap_config()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(verify_password("x", "not-a-hash").is_err());
    }
}
