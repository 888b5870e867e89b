use axum::{
    Extension, Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, LoginResponse, MessageResponse};
use crate::models::user::User;
use crate::services::{AuthError, Registration};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub employee_id: String,
    pub company_id: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// Identity attached to a request by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::Unauthorized => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::EmailTaken | AuthError::EmployeeIdTaken => Self::Conflict(err.to_string()),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::UserNotFound | AuthError::EmailNotFound => Self::NotFound(err.to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <token>` and attaches [`CurrentUser`].
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let user_id = state.auth_service().authenticate(&token)?;
    tracing::Span::current().record("user_id", &user_id);

    request.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then(|| token.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(LoginResponse {
        token: result.token,
        user: result.user,
    })))
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .auth_service()
        .register(Registration {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            employee_id: payload.employee_id,
            company_id: payload.company_id,
            company_name: payload.company_name,
        })
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/forgot-password
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    state.auth_service().forgot_password(&payload.email).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password reset instructions have been sent to your email",
    ))))
}

/// GET /auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.auth_service().current_user(&user_id).await?;
    Ok(Json(ApiResponse::success(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc".into()));
        assert_eq!(bearer_token(&headers("bearer  abc ")), Some("abc".into()));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
