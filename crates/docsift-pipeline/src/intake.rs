//! Upload intake.
//!
//! Validates a caller-supplied file and stages a private copy in a temporary
//! directory. The directory is removed when the [`StagedUpload`] is dropped,
//! whatever the extraction outcome.

use docsift_core::{DocumentType, ErrorKind, ExtractionInput, ProcessingMethod};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;

/// Default upload size limit (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Errors raised while accepting an upload.
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("file is {size} bytes, larger than the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntakeError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::LoadFailure
    }
}

/// Intake limits.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Largest accepted file, in bytes
    pub max_file_size: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// A validated upload copied into its own temporary directory.
#[derive(Debug)]
pub struct StagedUpload {
    dir: TempDir,
    path: PathBuf,
    mime_type: String,
    size: u64,
}

impl StagedUpload {
    /// Path of the staged copy.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared or inferred MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Directory that is removed on drop.
    pub fn staging_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Build an extraction request for the staged copy.
    #[must_use]
    pub fn to_input(&self, method: ProcessingMethod) -> ExtractionInput {
        ExtractionInput::new(&self.path, &self.mime_type, method)
    }
}

/// Infer a MIME type from the file extension.
///
/// Unknown extensions map to `application/octet-stream`, which extraction
/// rejects as unsupported.
#[must_use]
pub fn mime_type_for_path(path: &Path) -> &'static str {
    DocumentType::from_path(path).map_or("application/octet-stream", DocumentType::mime_type)
}

/// Validate `source` and stage a copy.
///
/// When `mime_type` is `None` it is inferred from the extension.
pub async fn stage_upload(
    source: &Path,
    mime_type: Option<&str>,
    config: &IntakeConfig,
) -> Result<StagedUpload, IntakeError> {
    let metadata = match tokio::fs::metadata(source).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(IntakeError::FileNotFound(source.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_file() {
        return Err(IntakeError::NotAFile(source.to_path_buf()));
    }

    let size = metadata.len();
    if size > config.max_file_size {
        return Err(IntakeError::FileTooLarge {
            size,
            limit: config.max_file_size,
        });
    }

    let mime_type = mime_type.map_or_else(
        || mime_type_for_path(source).to_string(),
        |m| m.trim().to_string(),
    );

    let dir = tempfile::Builder::new()
        .prefix("docsift-upload-")
        .tempdir()?;
    let file_name = source
        .file_name()
        .map_or_else(|| "upload".into(), std::ffi::OsStr::to_os_string);
    let path = dir.path().join(file_name);
    tokio::fs::copy(source, &path).await?;

    debug!(
        "Staged {:?} ({} bytes, {}) at {:?}",
        source, size, mime_type, path
    );

    Ok(StagedUpload {
        dir,
        path,
        mime_type,
        size,
    })
}
