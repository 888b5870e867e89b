//! `SeaORM` implementation of the `AuthService` trait.

use anyhow::Context;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tokio::sync::OnceCell;
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{InsertUserError, Store, UniqueField};
use crate::db::repositories::user::{hash_password, verify_password};
use crate::models::user::{NewUser, User};
use crate::services::auth_service::{AuthError, AuthService, LoginResult, Registration};
use crate::services::token::TokenIssuer;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex"));

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(())
}

fn validate_registration(registration: &Registration) -> Result<(), String> {
    if registration.name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    if registration.employee_id.trim().is_empty() {
        return Err("Employee ID is required".to_string());
    }
    let email = registration.email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid".to_string());
    }
    validate_password(&registration.password)
}

/// Hashes off the async runtime.
pub async fn hash_blocking(password: &str, config: &SecurityConfig) -> Result<String, anyhow::Error> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

pub async fn verify_blocking(password: &str, password_hash: &str) -> Result<bool, anyhow::Error> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .context("Password verification task panicked")?
}

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    tokens: TokenIssuer,
    /// Verified against when the email is unknown so both login failures cost the same.
    dummy_hash: OnceCell<String>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, security: SecurityConfig, tokens: TokenIssuer) -> Self {
        Self {
            store,
            security,
            tokens,
            dummy_hash: OnceCell::new(),
        }
    }

    async fn dummy_hash(&self) -> Result<&str, AuthError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| hash_blocking("facegate-timing-equalizer", &self.security))
            .await?;
        Ok(hash.as_str())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        validate_registration(&registration).map_err(AuthError::Validation)?;

        let email = normalize_email(&registration.email);
        let employee_id = registration.employee_id.trim().to_string();

        if self.store.email_exists(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.store.employee_id_exists(&employee_id).await? {
            return Err(AuthError::EmployeeIdTaken);
        }

        let password_hash = hash_blocking(&registration.password, &self.security).await?;

        let user = self
            .store
            .insert_user(NewUser {
                employee_id,
                name: registration.name.trim().to_string(),
                email,
                password_hash,
                company_id: registration.company_id,
                company_name: registration.company_name,
            })
            .await
            .map_err(|e| match e {
                InsertUserError::UniqueViolation {
                    field: UniqueField::Email,
                } => AuthError::EmailTaken,
                InsertUserError::UniqueViolation {
                    field: UniqueField::EmployeeId,
                } => AuthError::EmployeeIdTaken,
                InsertUserError::Other(e) => AuthError::from(e),
            })?;

        info!(user_id = %user.id, employee_id = %user.employee_id, "User registered");
        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let email = normalize_email(email);

        let Some((user, password_hash)) = self.store.get_user_with_password(&email).await? else {
            let dummy = self.dummy_hash().await?;
            let _ = verify_blocking(password, dummy).await?;
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_blocking(password, &password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&user.id)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        info!(user_id = %user.id, "User logged in");
        Ok(LoginResult { token, user })
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);
        if !EMAIL_RE.is_match(&email) {
            return Err(AuthError::Validation("Email format is invalid".to_string()));
        }

        match self.store.get_user_by_email(&email).await? {
            Some(user) => {
                info!(user_id = %user.id, "Password reset requested");
                Ok(())
            }
            None => Err(AuthError::EmailNotFound),
        }
    }

    async fn current_user(&self, user_id: &str) -> Result<User, AuthError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    fn authenticate(&self, token: &str) -> Result<String, AuthError> {
        self.tokens
            .validate(token)
            .map(|claims| claims.user_id)
            .map_err(|_| AuthError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            name: "Ayu".into(),
            email: "ayu@example.com".into(),
            password: "secret1".into(),
            employee_id: "EMP-001".into(),
            ..Registration::default()
        }
    }

    #[test]
    fn accepts_valid_registration() {
        assert!(validate_registration(&registration()).is_ok());
    }

    #[test]
    fn rejects_missing_or_malformed_fields() {
        let mut r = registration();
        r.name = "  ".into();
        assert_eq!(validate_registration(&r).unwrap_err(), "Name is required");

        let mut r = registration();
        r.email = "not-an-email".into();
        assert_eq!(validate_registration(&r).unwrap_err(), "Email format is invalid");

        let mut r = registration();
        r.password = "12345".into();
        assert!(validate_registration(&r).unwrap_err().contains("at least 6"));

        let mut r = registration();
        r.employee_id = String::new();
        assert_eq!(validate_registration(&r).unwrap_err(), "Employee ID is required");
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ayu@Example.COM "), "ayu@example.com");
    }
}
