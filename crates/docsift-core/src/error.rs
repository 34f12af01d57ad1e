//! Error types for docsift.
//!
//! Every error exposes [`ErrorKind`] through a `kind()` method so callers can
//! branch on the category without inspecting messages or nested sources.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Category of an extraction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// MIME type outside the supported set
    UnsupportedType,
    /// Extraction produced no usable text
    NoContent,
    /// File could not be opened or parsed as the declared format
    LoadFailure,
    /// Recognition engine error
    OcrFailure,
    /// Remote quota or rate limit reached
    QuotaExceeded,
    /// Remote credential rejected
    AuthFailure,
    /// Remote service down, overloaded or timed out
    ServiceUnavailable,
    /// Document exceeds what the remote model accepts
    ContentTooLarge,
    /// Any other remote failure
    GenericFailure,
    /// Invalid or missing configuration
    Config,
}

impl ErrorKind {
    /// Whether this kind originates from the AI pipeline.
    #[must_use]
    pub fn is_ai(self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded
                | Self::AuthFailure
                | Self::ServiceUnavailable
                | Self::ContentTooLarge
                | Self::GenericFailure
        )
    }
}

/// Main error type for docsift operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any extraction ran
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// Standard (local) extraction failed
    #[error("standard extraction failed: {0}")]
    Standard(#[source] ExtractError),

    /// AI extraction failed
    #[error("ai extraction failed: {0}")]
    Ai(#[from] AiPipelineError),

    /// Configuration error
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Self::Standard(e) => e.kind(),
            Self::Ai(e) => e.kind(),
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

/// Content extraction errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("no text content: {0}")]
    NoContent(String),

    #[error("failed to load document: {0}")]
    LoadFailure(String),

    #[error("ocr error: {0}")]
    Ocr(#[from] OcrError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Self::NoContent(_) => ErrorKind::NoContent,
            Self::LoadFailure(_) | Self::Io(_) => ErrorKind::LoadFailure,
            Self::Ocr(_) => ErrorKind::OcrFailure,
        }
    }
}

/// Recognition worker errors.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Worker could not be created
    #[error("recognition worker unavailable: {0}")]
    WorkerUnavailable(String),

    /// Recognition ran but failed
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// Recognition exceeded its time budget
    #[error("recognition timed out after {0:?}")]
    Timeout(Duration),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classified failure of a remote model call.
///
/// Produced by classifying a [`RemoteError`]; each variant carries the
/// upstream message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("authentication failed: {message}")]
    AuthFailure { message: String },

    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("content too large: {message}")]
    ContentTooLarge { message: String },

    #[error("{message}")]
    GenericFailure { message: String },
}

impl AiError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::AuthFailure { .. } => ErrorKind::AuthFailure,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::ContentTooLarge { .. } => ErrorKind::ContentTooLarge,
            Self::GenericFailure { .. } => ErrorKind::GenericFailure,
        }
    }

    /// Upstream message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::QuotaExceeded { message }
            | Self::AuthFailure { message }
            | Self::ServiceUnavailable { message }
            | Self::ContentTooLarge { message }
            | Self::GenericFailure { message } => message,
        }
    }

    /// What the user can do about it.
    #[must_use]
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => {
                "The AI provider quota or rate limit was reached. Switch to standard extraction or try again later."
            }
            Self::AuthFailure { .. } => {
                "The AI provider rejected the credentials. Check the configured API key."
            }
            Self::ServiceUnavailable { .. } => {
                "The AI service is temporarily unavailable. Retry later or use standard extraction."
            }
            Self::ContentTooLarge { .. } => {
                "The document is too large for the AI model. Retry with a smaller document."
            }
            Self::GenericFailure { .. } => {
                "AI extraction failed. Use standard extraction instead."
            }
        }
    }
}

/// Normalized shape of an upstream API failure.
///
/// Remote clients convert whatever their transport reports into this struct;
/// classification only ever looks at these four fields.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    /// HTTP status, when a response was received
    pub status_code: Option<u16>,
    /// Provider error type (e.g. `insufficient_quota`)
    pub error_type: Option<String>,
    /// Provider error code (e.g. `context_length_exceeded`)
    pub error_code: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl RemoteError {
    /// Create an error carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Attach an HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    /// Attach a provider error type.
    #[must_use]
    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Attach a provider error code.
    #[must_use]
    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    /// A call that exceeded its deadline.
    #[must_use]
    pub fn timeout(after: Duration) -> Self {
        Self::new(format!("request timed out after {after:?}")).with_type("timeout")
    }
}

/// Errors from the AI pipeline.
#[derive(Error, Debug)]
pub enum AiPipelineError {
    /// Local pre-extraction (PDF text, file read) failed
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Remote model call failed
    #[error(transparent)]
    Remote(#[from] AiError),
}

impl AiPipelineError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Extract(e) => e.kind(),
            Self::Remote(e) => e.kind(),
        }
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No API credential found in config or environment
    #[error("no API key configured (set `ai.api_key` or the {env_var} environment variable)")]
    MissingApiKey { env_var: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// HTTP client could not be built
    #[error("http client error: {0}")]
    Client(String),
}

/// Result type alias for docsift operations.
pub type Result<T> = std::result::Result<T, Error>;
