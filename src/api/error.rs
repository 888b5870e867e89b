use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use super::observability::Outcome;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    /// A well-formed request the attendance rules turned down.
    Rejected { reason: &'static str, message: String },

    Conflict(String),

    InternalError(String),

    Unauthorized(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Rejected { reason, message } => write!(f, "Rejected ({reason}): {message}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} error: {}", service, message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{service} service is unavailable"),
                )
            }
            // Duplicate registrations are reported as bad requests.
            Self::ValidationError(msg) | Self::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Rejected { message, .. } => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        };

        let outcome = match &self {
            Self::Rejected { reason, .. } => Outcome(*reason),
            Self::ValidationError(_) => Outcome("validation"),
            Self::Conflict(_) => Outcome("conflict"),
            Self::NotFound(_) => Outcome("not_found"),
            Self::ExternalApiError { .. } => Outcome("upstream_error"),
            Self::DatabaseError(_) | Self::InternalError(_) => Outcome("error"),
            Self::Unauthorized(_) => Outcome("unauthorized"),
        };

        let body = ApiResponse::<()>::error(error_message);
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(outcome);
        response
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn rejected(reason: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            reason,
            message: message.into(),
        }
    }

    pub fn external(service: &str, msg: impl Into<String>) -> Self {
        Self::ExternalApiError {
            service: service.to_string(),
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn conflict_is_a_bad_request() {
        let (status, body) = render(ApiError::Conflict("Email already registered".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Email already registered");
    }

    #[tokio::test]
    async fn rejection_is_a_tagged_bad_request() {
        let response = ApiError::rejected("face_mismatch", "Face does not match").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.extensions().get::<Outcome>(),
            Some(&Outcome("face_mismatch"))
        );

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Face does not match");
    }

    #[tokio::test]
    async fn validation_errors_are_tagged_separately() {
        let response = ApiError::validation("Location is required").into_response();
        assert_eq!(
            response.extensions().get::<Outcome>(),
            Some(&Outcome("validation"))
        );
    }

    #[tokio::test]
    async fn upstream_details_are_not_leaked() {
        let (status, body) = render(ApiError::external(
            "Face recognition",
            "500: Traceback (most recent call last)",
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Face recognition service is unavailable");
    }

    #[tokio::test]
    async fn database_errors_are_generic() {
        let (status, body) = render(ApiError::DatabaseError("no such table: users".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "A database error occurred");
        assert!(body.get("data").is_none());
    }
}
