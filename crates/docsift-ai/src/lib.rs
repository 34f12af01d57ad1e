//! # docsift-ai
//!
//! AI-assisted extraction through a remote chat completion API.
//!
//! ## Flow
//!
//! | Input | Calls |
//! |-------|-------|
//! | `image/*` | raw-text pass on the image, then structured pass on the image |
//! | `application/pdf` | local PDF text extraction, then structured pass on the text |
//!
//! Every call runs under a timeout. Failures are normalized into
//! [`RemoteError`](docsift_core::RemoteError) and mapped by [`classify`] onto
//! [`AiError`](docsift_core::AiError).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use docsift_ai::{AiConfig, AiPipeline, ChatCompletionClient};
//! use std::sync::Arc;
//!
//! // Fails with ConfigError::MissingApiKey when no key is configured
//! let client = ChatCompletionClient::new(&AiConfig::default())?;
//! let pipeline = AiPipeline::new(Arc::new(client));
//!
//! let result = pipeline.run(Path::new("invoice.jpg"), "image/jpeg").await?;
//! println!("{}", serde_json::to_string_pretty(&result.structured_data)?);
//! ```

pub mod classify;
pub mod client;
pub mod pipeline;
pub mod prompts;
pub mod structured;

pub use classify::classify;
pub use client::{
    build_request_body, parse_error_body, AiConfig, ChatCompletionClient, DEFAULT_API_KEY_ENV,
};
pub use pipeline::{run_ai_extraction, AiPipeline, DEFAULT_CALL_TIMEOUT};
pub use structured::parse_structured;
