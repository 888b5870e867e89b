use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::AssetStoreConfig;
use crate::models::photo::Photo;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset upload failed: {0}")]
    Upload(String),

    #[error("asset host returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to store asset locally: {0}")]
    Io(#[from] std::io::Error),
}

/// Persists a photo and returns a URL (or public path) that serves it.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload(&self, photo: &Photo, folder: &str) -> Result<String, AssetError>;
}

fn unique_name(photo: &Photo) -> String {
    format!("{}.{}", uuid::Uuid::new_v4(), photo.extension())
}

// ============================================================================
// Cloudinary
// ============================================================================

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    error: UploadErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UploadErrorDetail {
    message: String,
}

pub struct CloudinaryStore {
    client: Client,
    upload_url: String,
    api_key: String,
    api_secret: String,
    timeout: Duration,
}

impl CloudinaryStore {
    #[must_use]
    pub fn new(client: Client, config: &AssetStoreConfig) -> Self {
        Self {
            client,
            upload_url: format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                config.cloud_name
            ),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    #[must_use]
    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }
}

/// Signature over the alphabetically sorted upload parameters followed by the API secret.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(key, _)| *key);

    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    async fn upload(&self, photo: &Photo, folder: &str) -> Result<String, AssetError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let public_id = uuid::Uuid::new_v4().to_string();
        let signature = sign(
            &[
                ("folder", folder),
                ("public_id", &public_id),
                ("timestamp", &timestamp),
            ],
            &self.api_secret,
        );

        let file = Part::bytes(photo.bytes.clone())
            .file_name(photo.filename.clone())
            .mime_str(&photo.content_type)
            .map_err(|e| AssetError::Upload(format!("invalid content type: {e}")))?;

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("public_id", public_id)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AssetError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Asset upload rejected");
            let message = serde_json::from_str::<UploadErrorBody>(&body)
                .map_or_else(|_| body.trim().to_string(), |b| b.error.message);
            return Err(AssetError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AssetError::Upload(format!("unexpected upload response: {e}")))?;

        info!(folder, url = %uploaded.secure_url, "Uploaded photo");
        Ok(uploaded.secure_url)
    }
}

// ============================================================================
// Local filesystem fallback
// ============================================================================

/// Writes photos under `root/<folder>/` and returns `/uploads/<folder>/<name>`.
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn safe_folder(folder: &str) -> String {
    let cleaned: String = folder
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "misc".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn upload(&self, photo: &Photo, folder: &str) -> Result<String, AssetError> {
        let folder = safe_folder(folder);
        let dir = self.root.join(&folder);
        tokio::fs::create_dir_all(&dir).await?;

        let name = unique_name(photo);
        tokio::fs::write(dir.join(&name), &photo.bytes).await?;

        Ok(format!("/uploads/{folder}/{name}"))
    }
}
