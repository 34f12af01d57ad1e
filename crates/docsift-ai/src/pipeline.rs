//! AI extraction pipeline.
//!
//! Images go to the model twice: a raw-text pass and a structured pass.
//! PDFs are converted to text locally and only the structured pass runs, so
//! the model never receives PDF bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use docsift_core::{
    AiError, AiExtractionResult, AiPipelineError, CompletionModel, CompletionRequest,
    ContentExtractor, ExtractError, InlineImage, RemoteError, StructuredData,
};
use docsift_extract::PdfExtractor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::prompts::{structured_image_prompt, structured_text_prompt, RAW_TEXT_PROMPT};
use crate::structured::parse_structured;

/// Default per-call time budget.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Remote extraction over a [`CompletionModel`].
pub struct AiPipeline {
    model: Arc<dyn CompletionModel>,
    pdf: PdfExtractor,
    timeout: Duration,
}

impl AiPipeline {
    /// Create a pipeline with the default call timeout.
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self::with_timeout(model, DEFAULT_CALL_TIMEOUT)
    }

    /// Create a pipeline with a custom per-call timeout.
    pub fn with_timeout(model: Arc<dyn CompletionModel>, timeout: Duration) -> Self {
        Self {
            model,
            pdf: PdfExtractor::new(),
            timeout,
        }
    }

    /// Name of the underlying model.
    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Transcribe all text in a base64-encoded image.
    pub async fn extract_raw_text(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<String, AiError> {
        let request = CompletionRequest::text(RAW_TEXT_PROMPT).with_image(inline_image(
            image_base64,
            mime_type,
        ));

        let content = self.call(request).await?;
        Ok(content.map(|text| text.trim().to_string()).unwrap_or_default())
    }

    /// Ask the model for structured fields.
    ///
    /// With a `mime_type`, `content` is base64 image data; without one it is
    /// plain document text. Unparseable answers yield an empty map.
    pub async fn extract_structured_data(
        &self,
        content: &str,
        mime_type: Option<&str>,
    ) -> Result<StructuredData, AiError> {
        let request = match mime_type {
            Some(mime_type) => CompletionRequest::text(structured_image_prompt())
                .with_image(inline_image(content, mime_type)),
            None => CompletionRequest::text(structured_text_prompt(content)),
        }
        .json();

        let response = self.call(request).await?;
        Ok(parse_structured(response.as_deref()))
    }

    /// Run AI extraction on a file.
    pub async fn run(
        &self,
        path: &Path,
        mime_type: &str,
    ) -> Result<AiExtractionResult, AiPipelineError> {
        let normalized = mime_type.trim().to_ascii_lowercase();
        info!("AI extraction of {:?} as {} with {}", path, normalized, self.model_name());

        if normalized == "application/pdf" {
            let text = self.pdf.extract(path).await?;
            let structured_data = self.extract_structured_data(&text, None).await?;
            return Ok(AiExtractionResult {
                structured_data,
                raw_text: text,
                error_occurred: false,
            });
        }

        if normalized.starts_with("image/") {
            let bytes = tokio::fs::read(path).await.map_err(ExtractError::from)?;
            let encoded = STANDARD.encode(&bytes);
            debug!("Encoded {} bytes of image data", bytes.len());

            let raw_text = self.extract_raw_text(&encoded, &normalized).await?;
            let structured_data = self
                .extract_structured_data(&encoded, Some(&normalized))
                .await?;
            return Ok(AiExtractionResult {
                structured_data,
                raw_text,
                error_occurred: false,
            });
        }

        Err(ExtractError::UnsupportedType(mime_type.to_string()).into())
    }

    /// One model call under the timeout, with failures classified.
    async fn call(&self, request: CompletionRequest) -> Result<Option<String>, AiError> {
        let result = match tokio::time::timeout(self.timeout, self.model.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::timeout(self.timeout)),
        };

        result.map_err(|remote| {
            let classified = classify(&remote);
            warn!(
                "Model call failed ({:?}, status {:?}): {}",
                classified.kind(),
                remote.status_code,
                remote.message
            );
            classified
        })
    }
}

/// Run AI extraction on a file.
pub async fn run_ai_extraction(
    pipeline: &AiPipeline,
    path: &Path,
    mime_type: &str,
) -> Result<AiExtractionResult, AiPipelineError> {
    pipeline.run(path, mime_type).await
}

/// `image/jpg` is not a registered type; send `image/jpeg` instead.
fn inline_image(data_base64: &str, mime_type: &str) -> InlineImage {
    let mime_type = if mime_type.eq_ignore_ascii_case("image/jpg") {
        "image/jpeg"
    } else {
        mime_type
    };
    InlineImage {
        data_base64: data_base64.to_string(),
        mime_type: mime_type.to_string(),
    }
}
