//! Domain service for accounts: registration, login, tokens.

use serde::Serialize;
use thiserror::Error;

use crate::models::user::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password are deliberately the same error.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    Unauthorized,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Employee ID already registered")]
    EmployeeIdTaken,

    #[error("{0}")]
    Validation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Email not found")]
    EmailNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub employee_id: String,
    pub company_id: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}

/// Domain service trait for accounts.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a user after validating input and checking email and employee ID uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] or [`AuthError::EmployeeIdTaken`] on duplicates.
    async fn register(&self, registration: Registration) -> Result<User, AuthError>;

    /// Checks credentials and issues a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for any credential mismatch.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Succeeds when the address belongs to a user. No mail is sent.
    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    async fn current_user(&self, user_id: &str) -> Result<User, AuthError>;

    /// Resolves a bearer token to the user ID it was issued for.
    fn authenticate(&self, token: &str) -> Result<String, AuthError>;
}
