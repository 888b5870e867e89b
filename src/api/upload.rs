use axum::extract::Multipart;

use super::ApiError;
use crate::models::photo::Photo;

/// Fields of a photo upload form: a `photo` file and an optional `location` text field.
#[derive(Debug, Default)]
pub struct PhotoForm {
    pub photo: Option<Photo>,
    pub location: Option<String>,
}

impl PhotoForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
        {
            match field.name() {
                Some("photo") => {
                    let filename = field.file_name().map(ToString::to_string);
                    let content_type = field.content_type().map(ToString::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::validation(format!("Failed to read photo: {e}")))?;
                    form.photo = Some(Photo::new(bytes.to_vec(), filename, content_type));
                }
                Some("location") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::validation(format!("Invalid location: {e}")))?;
                    form.location = Some(text);
                }
                _ => {}
            }
        }

        Ok(form)
    }

    pub fn require_photo(&mut self) -> Result<Photo, ApiError> {
        self.photo
            .take()
            .filter(|photo| !photo.is_empty())
            .ok_or_else(|| ApiError::validation("Photo is required"))
    }

    pub fn require_location(&mut self) -> Result<String, ApiError> {
        self.location
            .take()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ApiError::validation("Location is required"))
    }
}
