//! HTTP client for OpenAI-compatible chat completion APIs.

use async_trait::async_trait;
use docsift_core::{CompletionModel, CompletionRequest, ConfigError, RemoteError, ResponseFormat};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Environment variable read when no key is set in the config file.
pub const DEFAULT_API_KEY_ENV: &str = "DOCSIFT_AI_API_KEY";

/// Configuration for the remote model.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// API root, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Model identifier (must accept images)
    pub model: String,
    /// Explicit API key; takes precedence over `api_key_env`
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-request time budget
    pub timeout: Duration,
    /// Completion length cap
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout: Duration::from_secs(60),
            max_tokens: 4096,
        }
    }
}

impl AiConfig {
    /// The configured key, falling back to the environment.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

/// [`CompletionModel`] backed by `POST {base_url}/chat/completions`.
pub struct ChatCompletionClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl ChatCompletionClient {
    /// Build a client, failing when no API key is available.
    pub fn new(config: &AiConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| ConfigError::MissingApiKey {
                env_var: config.api_key_env.clone(),
            })?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| ConfigError::Invalid("API key contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: config.timeout,
        })
    }

    /// Full URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, error: &reqwest::Error) -> RemoteError {
        if error.is_timeout() {
            RemoteError::timeout(self.timeout)
        } else if error.is_connect() {
            RemoteError::new(format!("connection failed: {error}")).with_type("connection")
        } else {
            let remote = RemoteError::new(error.to_string());
            match error.status() {
                Some(status) => remote.with_status(status.as_u16()),
                None => remote,
            }
        }
    }
}

#[async_trait]
impl CompletionModel for ChatCompletionClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>, RemoteError> {
        let body = build_request_body(&self.model, self.max_tokens, &request);
        debug!(
            "POST {} (model {}, image: {}, json: {})",
            self.endpoint,
            self.model,
            request.image.is_some(),
            request.response_format == ResponseFormat::Json
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &text));
        }

        parse_completion(&text)
    }
}

/// Build the JSON body for a chat completion request.
#[must_use]
pub fn build_request_body(model: &str, max_tokens: u32, request: &CompletionRequest) -> Value {
    let content = match &request.image {
        None => json!(request.prompt),
        Some(image) => json!([
            { "type": "text", "text": request.prompt },
            { "type": "image_url", "image_url": { "url": image.to_data_url() } },
        ]),
    };

    let mut body = json!({
        "model": model,
        "messages": [{ "role": "user", "content": content }],
        "max_tokens": max_tokens,
    });
    if request.response_format == ResponseFormat::Json {
        body["response_format"] = json!({ "type": "json_object" });
    }
    body
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<Value>,
}

/// Normalize an error response body into a [`RemoteError`].
#[must_use]
pub fn parse_error_body(status: u16, body: &str) -> RemoteError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => RemoteError {
            status_code: Some(status),
            error_type: error.error_type,
            error_code: error.code.and_then(|code| match code {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
            message: error
                .message
                .unwrap_or_else(|| format!("request failed with status {status}")),
        },
        Err(_) => {
            let body = body.trim();
            let message = if body.is_empty() {
                format!("request failed with status {status}")
            } else {
                body.to_string()
            };
            RemoteError::new(message).with_status(status)
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Pull the first choice's content out of a success body.
fn parse_completion(body: &str) -> Result<Option<String>, RemoteError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| RemoteError::new(format!("malformed completion response: {e}")))?;

    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty()))
}
