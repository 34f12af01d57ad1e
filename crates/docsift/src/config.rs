//! Configuration handling for docsift.
//!
//! Loaded from `<config_dir>/config.toml`; every field has a default so a
//! missing file or a partial file both work.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use docsift_ai::{AiConfig, DEFAULT_API_KEY_ENV};
use docsift_extract::OcrConfig;
use docsift_pipeline::{IntakeConfig, DEFAULT_MAX_FILE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote model configuration
    #[serde(default)]
    pub ai: AiSection,

    /// OCR configuration
    #[serde(default)]
    pub ocr: OcrSection,

    /// Upload intake configuration
    #[serde(default)]
    pub intake: IntakeSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSection {
    /// OpenAI-compatible API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Vision-capable model
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; prefer `api_key_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Completion length cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl AiSection {
    /// Convert to the client configuration.
    pub fn to_ai_config(&self) -> AiConfig {
        AiConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            api_key_env: self.api_key_env.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_tokens: self.max_tokens,
        }
    }
}

/// OCR configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSection {
    /// Tesseract executable
    #[serde(default = "default_ocr_binary")]
    pub binary: PathBuf,

    /// Language model
    #[serde(default = "default_ocr_language")]
    pub language: String,

    /// Per-image timeout (seconds)
    #[serde(default = "default_ocr_timeout_secs")]
    pub timeout_secs: u64,

    /// Max concurrent recognition workers
    #[serde(default = "default_ocr_max_workers")]
    pub max_workers: usize,
}

fn default_ocr_binary() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

fn default_ocr_timeout_secs() -> u64 {
    120
}

fn default_ocr_max_workers() -> usize {
    2
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            binary: default_ocr_binary(),
            language: default_ocr_language(),
            timeout_secs: default_ocr_timeout_secs(),
            max_workers: default_ocr_max_workers(),
        }
    }
}

impl OcrSection {
    /// Convert to the pool configuration.
    pub fn to_ocr_config(&self) -> OcrConfig {
        OcrConfig {
            language: self.language.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_workers: self.max_workers,
        }
    }
}

/// Upload intake configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeSection {
    /// Maximum accepted file size (bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

impl Default for IntakeSection {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

impl IntakeSection {
    pub fn to_intake_config(&self) -> IntakeConfig {
        IntakeConfig {
            max_file_size: self.max_file_size,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const SAMPLE_TOML: &str = r#"# docsift configuration

[ai]
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"
# The key is read from this environment variable unless `api_key` is set.
api_key_env = "DOCSIFT_AI_API_KEY"
request_timeout_secs = 60
max_tokens = 4096

[ocr]
binary = "tesseract"
language = "eng"
timeout_secs = 120
max_workers = 2

[intake]
max_file_size = 10485760

[logging]
level = "info"
"#;

impl Config {
    /// Load from the default location, or defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; the default path may be absent.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => match Self::config_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.ocr.max_workers == 0 {
            anyhow::bail!("ocr.max_workers must be at least 1");
        }
        if self.ai.request_timeout_secs == 0 || self.ocr.timeout_secs == 0 {
            anyhow::bail!("timeouts must be at least 1 second");
        }
        Ok(())
    }

    /// Default config file location.
    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Sample configuration file.
    pub fn sample_toml() -> &'static str {
        SAMPLE_TOML
    }

    /// Copy with secrets masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.ai.api_key.is_some() {
            config.ai.api_key = Some("********".to_string());
        }
        config
    }
}

/// Get the XDG config directory for docsift.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("DOCSIFT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }

    ProjectDirs::from("", "", "docsift").map(|dirs| dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_toml_matches_defaults() {
        let config = Config::from_toml(Config::sample_toml()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.ai.base_url, defaults.ai.base_url);
        assert_eq!(config.ai.api_key_env, defaults.ai.api_key_env);
        assert_eq!(config.ocr.language, defaults.ocr.language);
        assert_eq!(config.ocr.max_workers, defaults.ocr.max_workers);
        assert_eq!(config.intake.max_file_size, defaults.intake.max_file_size);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_toml("[ai]\nmodel = \"local-vision\"\n").unwrap();

        assert_eq!(config.ai.model, "local-vision");
        assert_eq!(config.ai.request_timeout_secs, 60);
        assert_eq!(config.ocr.binary, PathBuf::from("tesseract"));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.ai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_toml("[ocr]\nmax_workers = 0\n").is_err());
        assert!(Config::from_toml("[ai]\nrequest_timeout_secs = 0\n").is_err());
        assert!(Config::from_toml("[ai]\nmodel = 42\n").is_err());
    }

    #[test]
    fn test_conversions() {
        let config = Config::from_toml(
            "[ai]\nrequest_timeout_secs = 5\nmax_tokens = 100\n[ocr]\ntimeout_secs = 9\nlanguage = \"deu\"\n",
        )
        .unwrap();

        let ai = config.ai.to_ai_config();
        assert_eq!(ai.timeout, Duration::from_secs(5));
        assert_eq!(ai.max_tokens, 100);

        let ocr = config.ocr.to_ocr_config();
        assert_eq!(ocr.timeout, Duration::from_secs(9));
        assert_eq!(ocr.language, "deu");

        assert_eq!(
            config.intake.to_intake_config().max_file_size,
            DEFAULT_MAX_FILE_SIZE
        );
    }

    #[test]
    fn test_load_from_explicit_path() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_missing_explicit_path_fails() {
        let temp_dir = tempdir().unwrap();
        assert!(Config::load_from(Some(temp_dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_redacted_hides_key() {
        let mut config = Config::default();
        config.ai.api_key = Some("sk-secret".to_string());

        let shown = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!shown.contains("sk-secret"));

        let shown = toml::to_string_pretty(&Config::default().redacted()).unwrap();
        assert!(!shown.contains("api_key ="));
    }
}
