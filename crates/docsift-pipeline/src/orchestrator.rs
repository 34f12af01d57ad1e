//! Top-level extraction entry point.
//!
//! Standard extraction always runs and its failure is final. The AI pass runs
//! only when requested; any AI failure, including AI not being configured, is
//! folded into a fallback result built from the standard text.

use docsift_ai::AiPipeline;
use docsift_core::{
    AiExtractionResult, DocumentType, Error, ErrorKind, ExtractionInput, MergedResult,
    ProcessingMethod, Result, StructuredData,
};
use docsift_extract::StandardPipeline;
use serde_json::Value;
use std::time::Instant;
use tracing::{info, warn};

const AI_NOT_CONFIGURED: &str = "AI extraction is not configured";
const CONFIGURE_AI: &str =
    "Set an API key in the [ai] config section to enable AI extraction, or use standard extraction.";

/// Runs the standard pipeline and, on request, the AI pipeline.
pub struct Orchestrator {
    standard: StandardPipeline,
    ai: Option<AiPipeline>,
}

impl Orchestrator {
    /// Create an orchestrator. `ai` is `None` when no model is configured.
    pub fn new(standard: StandardPipeline, ai: Option<AiPipeline>) -> Self {
        Self { standard, ai }
    }

    /// Whether an AI pipeline is available.
    pub fn ai_enabled(&self) -> bool {
        self.ai.is_some()
    }

    /// Process one document.
    ///
    /// Never deletes or modifies `input.file_path`.
    pub async fn process(&self, input: &ExtractionInput) -> Result<MergedResult> {
        let start = Instant::now();

        DocumentType::from_mime(&input.mime_type)
            .map_err(|_| Error::UnsupportedType(input.mime_type.clone()))?;

        let standard_text = self
            .standard
            .run(&input.file_path, &input.mime_type)
            .await?;

        let (ai_extracted_data, raw_extracted_text) = match input.method {
            ProcessingMethod::Standard => (None, standard_text.clone()),
            ProcessingMethod::Ai => {
                let ai = self.run_ai(input, &standard_text).await;
                let raw = if ai.error_occurred || ai.raw_text.trim().is_empty() {
                    standard_text.clone()
                } else {
                    ai.raw_text.clone()
                };
                (Some(ai), raw)
            }
        };

        let processing_time = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            "Processed {:?} ({}, {}) in {}ms",
            input.file_path, input.mime_type, input.method, processing_time
        );

        Ok(MergedResult {
            standard_extracted_text: standard_text,
            ai_extracted_data,
            raw_extracted_text,
            processing_time,
        })
    }

    async fn run_ai(&self, input: &ExtractionInput, standard_text: &str) -> AiExtractionResult {
        let Some(ai) = &self.ai else {
            warn!("AI extraction requested but not configured, using standard text");
            return fallback_result(AI_NOT_CONFIGURED, ErrorKind::Config, CONFIGURE_AI, standard_text);
        };

        match ai.run(&input.file_path, &input.mime_type).await {
            Ok(result) => result,
            Err(e) => {
                let error = Error::from(e);
                let kind = error.kind();
                if kind.is_ai() {
                    warn!("AI service call failed ({:?}), falling back to standard text: {}", kind, error);
                } else {
                    warn!("AI pre-extraction failed, falling back to standard text: {}", error);
                }
                let suggestion = match &error {
                    Error::Ai(docsift_core::AiPipelineError::Remote(remote)) => remote.guidance(),
                    _ => "AI extraction failed. Use standard extraction instead.",
                };
                fallback_result(&error.to_string(), kind, suggestion, standard_text)
            }
        }
    }
}

/// Result reported in place of AI output when the AI pass fails.
#[must_use]
pub fn fallback_result(
    reason: &str,
    kind: ErrorKind,
    suggestion: &str,
    standard_text: &str,
) -> AiExtractionResult {
    let mut structured_data = StructuredData::new();
    structured_data.insert("error".into(), Value::from("AI extraction failed"));
    structured_data.insert("reason".into(), Value::from(reason));
    structured_data.insert(
        "kind".into(),
        serde_json::to_value(kind).unwrap_or(Value::Null),
    );
    structured_data.insert("suggestion".into(), Value::from(suggestion));

    AiExtractionResult {
        structured_data,
        raw_text: standard_text.to_string(),
        error_occurred: true,
    }
}
