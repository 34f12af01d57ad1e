//! Standard (local) extraction pipeline.
//!
//! `application/pdf` goes to the PDF text extractor, `image/*` goes to OCR,
//! anything else is rejected. Extractor failures are wrapped in
//! [`Error::Standard`] so they all read "standard extraction failed: ...".

use docsift_core::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::image::ImageExtractor;
use crate::ocr::OcrPool;
use crate::pdf::PdfExtractor;
use crate::registry::ExtractorRegistry;

/// Local extraction without any remote service.
pub struct StandardPipeline {
    registry: ExtractorRegistry,
}

impl StandardPipeline {
    /// Create a pipeline with the PDF and OCR extractors registered.
    #[must_use]
    pub fn new(ocr: Arc<OcrPool>) -> Self {
        let mut registry = ExtractorRegistry::new();
        registry.register("pdf", PdfExtractor::new());
        registry.register("image", ImageExtractor::new(ocr));
        Self::with_registry(registry)
    }

    /// Create a pipeline over a custom registry.
    #[must_use]
    pub fn with_registry(registry: ExtractorRegistry) -> Self {
        debug!(
            "Standard pipeline extractors: {}",
            registry.names().collect::<Vec<_>>().join(", ")
        );
        Self { registry }
    }

    /// Extract text from `path`, dispatching on `mime_type`.
    pub async fn run(&self, path: &Path, mime_type: &str) -> Result<String, Error> {
        debug!("Standard extraction of {:?} as {}", path, mime_type);

        let text = self
            .registry
            .extract(path, mime_type)
            .await
            .map_err(Error::Standard)?;

        info!("Standard extraction produced {} chars", text.len());
        Ok(text)
    }
}

/// Run standard extraction, returning the wrapped error on failure.
pub async fn run_standard_extraction(
    pipeline: &StandardPipeline,
    path: &Path,
    mime_type: &str,
) -> Result<String, Error> {
    pipeline.run(path, mime_type).await
}
