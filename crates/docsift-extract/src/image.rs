//! Image content extractor.
//!
//! Decodes the image first so corrupt files fail fast, then runs OCR through
//! the shared [`OcrPool`].

use async_trait::async_trait;
use docsift_core::{ContentExtractor, ExtractError};
use image::GenericImageView;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::ocr::OcrPool;

/// Extractor for image files.
pub struct ImageExtractor {
    pool: Arc<OcrPool>,
}

impl ImageExtractor {
    /// Create a new image extractor backed by an OCR pool.
    #[must_use]
    pub fn new(pool: Arc<OcrPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentExtractor for ImageExtractor {
    fn supported_types(&self) -> &[&str] {
        &["image/jpeg", "image/jpg", "image/png"]
    }

    fn can_extract(&self, mime_type: &str) -> bool {
        mime_type.starts_with("image/")
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        extract_image_text(&self.pool, path).await
    }
}

/// Recognize the text in an image file.
pub async fn extract_image_text(pool: &OcrPool, path: &Path) -> Result<String, ExtractError> {
    debug!("Extracting image: {:?}", path);

    let bytes = tokio::fs::read(path).await?;
    let (width, height, format) = tokio::task::spawn_blocking(move || decode_image_metadata(&bytes))
        .await
        .map_err(|e| ExtractError::LoadFailure(format!("task join error: {e}")))?
        .map_err(ExtractError::LoadFailure)?;
    debug!("Decoded {}x{} {} image", width, height, format);

    let text = pool.recognize(path).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::NoContent(format!(
            "no text recognized in {}",
            path.display()
        )));
    }

    debug!("Recognized {} chars from {:?}", text.len(), path);
    Ok(text.to_string())
}

/// Decode image to get dimensions and format.
fn decode_image_metadata(bytes: &[u8]) -> Result<(u32, u32, String), String> {
    let img = image::load_from_memory(bytes).map_err(|e| format!("invalid image: {e}"))?;

    let (width, height) = img.dimensions();

    let format = image::guess_format(bytes).map_or_else(
        |_| "unknown".to_string(),
        |f| format!("{f:?}").to_lowercase(),
    );

    Ok((width, height, format))
}
