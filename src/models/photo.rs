/// An uploaded image held in memory between the multipart body and the asset store.
#[derive(Debug, Clone)]
pub struct Photo {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl Photo {
    #[must_use]
    pub fn new(bytes: Vec<u8>, filename: Option<String>, content_type: Option<String>) -> Self {
        let filename = filename
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "photo.jpg".to_string());
        let content_type = content_type.unwrap_or_else(|| {
            mime_guess::from_path(&filename)
                .first_or_octet_stream()
                .to_string()
        });

        Self {
            bytes,
            filename,
            content_type,
        }
    }

    /// File extension taken from the original filename, lowercased. Defaults to `jpg`.
    #[must_use]
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map_or_else(|| "jpg".to_string(), str::to_ascii_lowercase)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_filename_falls_back_to_jpeg() {
        let photo = Photo::new(vec![1, 2, 3], None, None);
        assert_eq!(photo.filename, "photo.jpg");
        assert_eq!(photo.content_type, "image/jpeg");
        assert_eq!(photo.extension(), "jpg");
    }

    #[test]
    fn extension_is_sanitized() {
        let photo = Photo::new(vec![1], Some("selfie.PNG".into()), None);
        assert_eq!(photo.extension(), "png");
        assert_eq!(photo.content_type, "image/png");

        let photo = Photo::new(vec![1], Some("../../etc/passwd.s h".into()), None);
        assert_eq!(photo.extension(), "jpg");
    }
}
