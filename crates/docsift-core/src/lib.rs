//! # docsift-core
//!
//! Core types and traits for docsift, a document text extractor with an
//! optional AI pass.
//!
//! ## Architecture
//!
//! ```text
//! ExtractionInput ─→ Standard pipeline (PDF text layer | OCR) ──────┐
//!                 └→ AI pipeline (CompletionModel, optional) ─ fallback ┴→ MergedResult
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ExtractionInput`] | Path, declared MIME type and processing method |
//! | [`DocumentType`] | Supported formats (`application/pdf`, `image/jpeg`, `image/jpg`, `image/png`) |
//! | [`PageText`] | Per-page PDF text |
//! | [`AiExtractionResult`] | Structured fields and raw text from the model |
//! | [`MergedResult`] | Final result handed to the caller |
//! | [`ErrorKind`] | Error taxonomy shared by every error type |
//!
//! ## Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`ContentExtractor`] | Extract text from a local file |
//! | [`OcrEngine`] | Acquire recognition workers |
//! | [`RecognitionWorker`] | Run recognition, then terminate |
//! | [`CompletionModel`] | Call a remote language model |

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    AiError, AiPipelineError, ConfigError, Error, ErrorKind, ExtractError, OcrError, RemoteError,
    Result,
};
pub use traits::*;
pub use types::*;
