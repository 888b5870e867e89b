use serde::{Deserialize, Serialize};

use crate::models::user::User;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingSavedResponse {
    pub message: String,
    pub embedding_id: String,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingResponse {
    pub user_id: String,
    pub embedding: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_data_serializes_as_null() {
        let body = serde_json::to_value(ApiResponse::success(None::<String>)).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "data": null}));
    }

    #[test]
    fn error_omits_data() {
        let body = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(body, serde_json::json!({"success": false, "error": "nope"}));
    }
}
