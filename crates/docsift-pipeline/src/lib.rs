//! Extraction orchestration for docsift.
//!
//! # Components
//!
//! - [`Orchestrator`]: Runs standard extraction, optionally the AI pass, and merges the results
//! - [`stage_upload`]: Validates an upload and stages a private copy
//! - [`StagedUpload`]: Staged copy whose directory is removed on drop
//!
//! # Example
//!
//! ```rust,ignore
//! use docsift_pipeline::{stage_upload, IntakeConfig, Orchestrator};
//! use docsift_core::ProcessingMethod;
//!
//! let orchestrator = Orchestrator::new(standard, ai);
//!
//! let staged = stage_upload(Path::new("invoice.jpg"), None, &IntakeConfig::default()).await?;
//! let result = orchestrator.process(&staged.to_input(ProcessingMethod::Ai)).await?;
//!
//! if result.ai_extracted_data.as_ref().is_some_and(|ai| ai.error_occurred) {
//!     // AI failed; raw_extracted_text holds the standard text
//! }
//! // staged copy is removed here
//! ```

pub mod intake;
pub mod orchestrator;

pub use intake::{
    mime_type_for_path, stage_upload, IntakeConfig, IntakeError, StagedUpload,
    DEFAULT_MAX_FILE_SIZE,
};
pub use orchestrator::{fallback_result, Orchestrator};
