use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::photo::Photo;

/// Outcome of a face match as reported by the recognition service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub verified: bool,
    pub similarity: Option<f64>,
    pub threshold: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("face recognition service unreachable: {0}")]
    Unreachable(String),

    #[error("face recognition service timed out")]
    Timeout,

    #[error("face recognition service returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid response from face recognition service: {0}")]
    Protocol(String),
}

#[async_trait]
pub trait FaceVerifier: Send + Sync {
    async fn verify(&self, photo: &Photo, user_id: &str) -> Result<Verdict, VerifyError>;
}

pub struct HttpFaceVerifier {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpFaceVerifier {
    #[must_use]
    pub fn new(client: Client, base_url: &str, timeout_seconds: u64) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/verify", self.base_url)
    }
}

#[async_trait]
impl FaceVerifier for HttpFaceVerifier {
    async fn verify(&self, photo: &Photo, user_id: &str) -> Result<Verdict, VerifyError> {
        let part = Part::bytes(photo.bytes.clone())
            .file_name(photo.filename.clone())
            .mime_str(&photo.content_type)
            .map_err(|e| VerifyError::Protocol(format!("invalid photo content type: {e}")))?;

        let form = Form::new()
            .part("photo", part)
            .text("user_id", user_id.to_string());

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(classify_transport_error)?;

        if status != StatusCode::OK {
            let message = rejection_message(&body);
            warn!(status = status.as_u16(), body = %body, "Face verification rejected");
            return Err(VerifyError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let verdict = parse_verdict(&body)?;
        debug!(
            user_id,
            verified = verdict.verified,
            similarity = ?verdict.similarity,
            threshold = ?verdict.threshold,
            "Face verification completed"
        );
        Ok(verdict)
    }
}

fn classify_transport_error(err: reqwest::Error) -> VerifyError {
    if err.is_timeout() {
        VerifyError::Timeout
    } else {
        VerifyError::Unreachable(err.to_string())
    }
}

/// Prefers the service's `error` field, then `message`, then the raw body.
fn rejection_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(Value::String(text)) = map.get(key)
                && !text.is_empty()
            {
                return text.clone();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "(empty response body)".to_string()
    } else {
        trimmed.to_string()
    }
}

/// A missing or non-boolean `verified` is a protocol error, never a negative verdict.
fn parse_verdict(body: &str) -> Result<Verdict, VerifyError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| VerifyError::Protocol(format!("response is not JSON: {e}")))?;

    let verified = value
        .get("verified")
        .and_then(Value::as_bool)
        .ok_or_else(|| VerifyError::Protocol("missing boolean 'verified' field".to_string()))?;

    Ok(Verdict {
        verified,
        similarity: value.get("similarity").and_then(Value::as_f64),
        threshold: value.get("threshold").and_then(Value::as_f64),
    })
}
