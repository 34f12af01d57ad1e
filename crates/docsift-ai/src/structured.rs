//! Lenient parsing of structured-pass responses.

use docsift_core::StructuredData;
use serde_json::Value;
use tracing::warn;

/// Parse a model response into a JSON object.
///
/// Absent content, invalid JSON and non-object JSON all yield an empty map.
#[must_use]
pub fn parse_structured(content: Option<&str>) -> StructuredData {
    let Some(content) = content else {
        warn!("Structured pass returned no content");
        return StructuredData::new();
    };

    match serde_json::from_str::<Value>(strip_code_fence(content)) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!("Structured pass returned non-object JSON: {}", json_kind(&other));
            StructuredData::new()
        }
        Err(e) => {
            warn!("Failed to parse structured response as JSON: {}", e);
            StructuredData::new()
        }
    }
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") on the opening line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
