//! # docsift-extract
//!
//! Local text extraction: PDF text layers and OCR for images.
//!
//! ## Supported Formats
//!
//! | Extractor | Formats | Notes |
//! |-----------|---------|-------|
//! | [`PdfExtractor`] | `application/pdf` | Page-by-page, unreadable pages skipped |
//! | [`ImageExtractor`] | `image/jpeg`, `image/jpg`, `image/png` (any `image/*`) | Decoded first, then OCR |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docsift_extract::{OcrConfig, OcrPool, StandardPipeline, TesseractEngine};
//! use std::sync::Arc;
//!
//! let pool = OcrPool::new(Arc::new(TesseractEngine::default()), OcrConfig::default());
//! let pipeline = StandardPipeline::new(Arc::new(pool));
//!
//! let text = pipeline.run(Path::new("scan.png"), "image/png").await?;
//! ```
//!
//! ## Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ExtractorRegistry`] | Routes files to extractors by MIME type |
//! | [`StandardPipeline`] | Registry preloaded with PDF and OCR, uniform error wrapping |
//! | [`OcrPool`] | Bounded recognition with per-call timeout |
//! | [`WorkerGuard`] | Terminates a recognition worker on drop |
//! | [`TesseractEngine`] | Recognition via the `tesseract` executable |

pub mod image;
pub mod ocr;
pub mod pdf;
pub mod registry;
pub mod standard;

pub use image::{extract_image_text, ImageExtractor};
pub use ocr::{OcrConfig, OcrPool, TesseractEngine, TesseractWorker, WorkerGuard};
pub use pdf::{collect_pages, extract_pdf_text, join_pages, PageSource, PdfExtractor};
pub use registry::ExtractorRegistry;
pub use standard::{run_standard_extraction, StandardPipeline};
