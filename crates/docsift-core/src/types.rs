//! Core types for docsift.
//!
//! ## Input
//! - [`DocumentType`]: The closed set of supported document formats
//! - [`ProcessingMethod`]: Standard-only or standard plus AI
//! - [`ExtractionInput`]: One extraction request
//!
//! ## Intermediate
//! - [`PageText`]: Per-page PDF text with success flag
//!
//! ## Output
//! - [`AiExtractionResult`]: Structured fields and raw text from the AI pass
//! - [`MergedResult`]: What the orchestrator hands back to its caller
//!
//! ## Remote model requests
//! - [`CompletionRequest`], [`InlineImage`], [`ResponseFormat`]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ExtractError;

/// Flat key-value mapping of fields inferred from a document.
pub type StructuredData = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Input
// ============================================================================

/// MIME types accepted for extraction.
pub const SUPPORTED_MIME_TYPES: &[&str] =
    &["application/pdf", "image/jpeg", "image/jpg", "image/png"];

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Jpeg,
    /// Non-standard `image/jpg`, still sent by some browsers
    Jpg,
    Png,
}

impl DocumentType {
    /// Resolve a declared MIME type, rejecting anything outside the supported set.
    pub fn from_mime(mime_type: &str) -> Result<Self, ExtractError> {
        match mime_type.trim().to_ascii_lowercase().as_str() {
            "application/pdf" => Ok(Self::Pdf),
            "image/jpeg" => Ok(Self::Jpeg),
            "image/jpg" => Ok(Self::Jpg),
            "image/png" => Ok(Self::Png),
            _ => Err(ExtractError::UnsupportedType(mime_type.to_string())),
        }
    }

    /// Guess the document type from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Canonical MIME type string.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Jpg => "image/jpg",
            Self::Png => "image/png",
        }
    }

    /// Whether this is a raster image.
    #[must_use]
    pub fn is_image(self) -> bool {
        !matches!(self, Self::Pdf)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Which pipelines to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMethod {
    /// Local parsing/OCR only
    #[default]
    Standard,
    /// Standard extraction plus the remote model pass
    Ai,
}

impl FromStr for ProcessingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "ai" => Ok(Self::Ai),
            other => Err(format!(
                "unknown processing method '{other}' (expected 'standard' or 'ai')"
            )),
        }
    }
}

impl fmt::Display for ProcessingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Ai => f.write_str("ai"),
        }
    }
}

/// A single extraction request.
///
/// The file at `file_path` belongs to the caller; extraction only reads it.
#[derive(Debug, Clone)]
pub struct ExtractionInput {
    /// Local path to the uploaded document
    pub file_path: PathBuf,
    /// Declared MIME type
    pub mime_type: String,
    /// Requested processing method
    pub method: ProcessingMethod,
}

impl ExtractionInput {
    /// Create a new extraction input.
    pub fn new(
        file_path: impl Into<PathBuf>,
        mime_type: impl Into<String>,
        method: ProcessingMethod,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            mime_type: mime_type.into(),
            method,
        }
    }
}

// ============================================================================
// Intermediate
// ============================================================================

/// Text recovered from one PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Fragments joined with single spaces; empty when `succeeded` is false
    pub text: String,
    /// Whether text retrieval for this page worked
    pub succeeded: bool,
}

// ============================================================================
// Output
// ============================================================================

/// Result of the AI pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiExtractionResult {
    /// Fields inferred by the model
    pub structured_data: StructuredData,
    /// Full unstructured text
    pub raw_text: String,
    /// True when this result is a fallback after an AI failure
    #[serde(default)]
    pub error_occurred: bool,
}

/// Final result of one orchestration call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedResult {
    /// Output of the standard pipeline
    pub standard_extracted_text: String,
    /// AI output, `None` when only standard extraction was requested
    pub ai_extracted_data: Option<AiExtractionResult>,
    /// Best available raw text
    pub raw_extracted_text: String,
    /// Wall-clock duration in milliseconds
    pub processing_time: u64,
}

// ============================================================================
// Remote model requests
// ============================================================================

/// How the model should format its answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// Strict JSON object
    Json,
}

/// Base64-encoded image attached to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Standard base64 without a `data:` prefix
    pub data_base64: String,
    pub mime_type: String,
}

impl InlineImage {
    /// Render as a `data:` URL.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }
}

/// A single-turn request to a completion model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Instruction text
    pub prompt: String,
    /// Optional image content
    pub image: Option<InlineImage>,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    /// Text-only request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            response_format: ResponseFormat::Text,
        }
    }

    /// Attach an image.
    #[must_use]
    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }

    /// Ask for a JSON object response.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.response_format = ResponseFormat::Json;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_from_mime_supported() {
        assert_eq!(
            DocumentType::from_mime("application/pdf").unwrap(),
            DocumentType::Pdf
        );
        assert_eq!(
            DocumentType::from_mime("image/jpeg").unwrap(),
            DocumentType::Jpeg
        );
        assert_eq!(
            DocumentType::from_mime("image/jpg").unwrap(),
            DocumentType::Jpg
        );
        assert_eq!(
            DocumentType::from_mime("image/png").unwrap(),
            DocumentType::Png
        );
    }

    #[test]
    fn test_document_type_from_mime_case_insensitive() {
        assert_eq!(
            DocumentType::from_mime("Application/PDF").unwrap(),
            DocumentType::Pdf
        );
    }

    #[test]
    fn test_document_type_rejects_unsupported() {
        for mime in ["application/zip", "image/gif", "text/plain", ""] {
            match DocumentType::from_mime(mime) {
                Err(ExtractError::UnsupportedType(m)) => assert_eq!(m, mime),
                other => panic!("expected UnsupportedType for {mime:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_supported_mime_types_round_trip() {
        for mime in SUPPORTED_MIME_TYPES {
            let doc = DocumentType::from_mime(mime).unwrap();
            assert_eq!(doc.mime_type(), *mime);
        }
    }

    #[test]
    fn test_document_type_from_path() {
        assert_eq!(
            DocumentType::from_path(Path::new("scan.PDF")),
            Some(DocumentType::Pdf)
        );
        assert_eq!(
            DocumentType::from_path(Path::new("photo.jpg")),
            Some(DocumentType::Jpeg)
        );
        assert_eq!(
            DocumentType::from_path(Path::new("photo.jpeg")),
            Some(DocumentType::Jpeg)
        );
        assert_eq!(
            DocumentType::from_path(Path::new("shot.png")),
            Some(DocumentType::Png)
        );
        assert_eq!(DocumentType::from_path(Path::new("archive.zip")), None);
        assert_eq!(DocumentType::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_document_type_is_image() {
        assert!(!DocumentType::Pdf.is_image());
        assert!(DocumentType::Jpeg.is_image());
        assert!(DocumentType::Png.is_image());
    }

    #[test]
    fn test_processing_method_from_str() {
        assert_eq!(
            "standard".parse::<ProcessingMethod>().unwrap(),
            ProcessingMethod::Standard
        );
        assert_eq!("AI".parse::<ProcessingMethod>().unwrap(), ProcessingMethod::Ai);
        assert!("ocr".parse::<ProcessingMethod>().is_err());
    }

    #[test]
    fn test_processing_method_display() {
        assert_eq!(ProcessingMethod::Standard.to_string(), "standard");
        assert_eq!(ProcessingMethod::Ai.to_string(), "ai");
        assert_eq!(ProcessingMethod::default(), ProcessingMethod::Standard);
    }

    #[test]
    fn test_merged_result_serializes_camel_case() {
        let mut structured = StructuredData::new();
        structured.insert("invoiceId".into(), "INV-001".into());

        let result = MergedResult {
            standard_extracted_text: "INV-001".into(),
            ai_extracted_data: Some(AiExtractionResult {
                structured_data: structured,
                raw_text: "INV-001".into(),
                error_occurred: false,
            }),
            raw_extracted_text: "INV-001".into(),
            processing_time: 12,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["standardExtractedText"], "INV-001");
        assert_eq!(json["rawExtractedText"], "INV-001");
        assert_eq!(json["processingTime"], 12);
        assert_eq!(json["aiExtractedData"]["structuredData"]["invoiceId"], "INV-001");
        assert_eq!(json["aiExtractedData"]["errorOccurred"], false);
    }

    #[test]
    fn test_merged_result_without_ai_serializes_null() {
        let result = MergedResult {
            standard_extracted_text: "text".into(),
            ai_extracted_data: None,
            raw_extracted_text: "text".into(),
            processing_time: 0,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["aiExtractedData"].is_null());
    }

    #[test]
    fn test_inline_image_data_url() {
        let image = InlineImage {
            data_base64: "AAAA".into(),
            mime_type: "image/png".into(),
        };
        assert_eq!(image.to_data_url(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_completion_request_builders() {
        let req = CompletionRequest::text("hello");
        assert_eq!(req.response_format, ResponseFormat::Text);
        assert!(req.image.is_none());

        let req = CompletionRequest::text("fields")
            .with_image(InlineImage {
                data_base64: "AA".into(),
                mime_type: "image/jpeg".into(),
            })
            .json();
        assert_eq!(req.response_format, ResponseFormat::Json);
        assert!(req.image.is_some());
    }
}
