//! Core traits for docsift components.
//!
//! - [`ContentExtractor`]: Turn a local file into text
//! - [`OcrEngine`] / [`RecognitionWorker`]: Acquire and drive text recognition workers
//! - [`CompletionModel`]: Send one prompt to a remote language model
//!
//! Implementations live in `docsift-extract` and `docsift-ai`; tests swap in
//! mocks at these seams.

use async_trait::async_trait;
use std::path::Path;

use crate::error::{ExtractError, OcrError, RemoteError};
use crate::types::CompletionRequest;

// ============================================================================
// Content Extraction
// ============================================================================

/// Trait for extracting text from files.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Returns the MIME types this extractor can handle.
    fn supported_types(&self) -> &[&str];

    /// Check if this extractor handles the given MIME type.
    fn can_extract(&self, mime_type: &str) -> bool {
        self.supported_types().contains(&mime_type)
    }

    /// Extract trimmed, non-empty text from a file.
    async fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

// ============================================================================
// OCR
// ============================================================================

/// Factory for recognition workers.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Create a worker bound to a language model (e.g. `eng`).
    ///
    /// On error, anything partially set up must already be released.
    async fn acquire(&self, language: &str) -> Result<Box<dyn RecognitionWorker>, OcrError>;
}

/// A live recognition worker.
///
/// Workers hold significant memory; every acquired worker must be terminated
/// exactly once.
#[async_trait]
pub trait RecognitionWorker: Send {
    /// Recognize the text in an image file.
    async fn recognize(&mut self, image: &Path) -> Result<String, OcrError>;

    /// Release the worker. Must not block and must tolerate repeated calls.
    fn terminate(&mut self);
}

// ============================================================================
// Remote Model
// ============================================================================

/// A remote chat-style completion model.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Run a single-turn completion. `Ok(None)` means the model answered with
    /// no content.
    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>, RemoteError>;
}
