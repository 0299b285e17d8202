use serde::{Deserialize, Serialize};

#[derive(Serialize, Clone)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: String,
}

#[derive(Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub output_text: Option<String>,
}

#[derive(Deserialize)]
pub struct OutputItem {
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

#[derive(Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

/// Pull the reply text out of a responses payload.
///
/// Each output entry contributes at most its first `output_text` part;
/// reasoning parts and other kinds are skipped. When no entry carries usable
/// text, a flat top-level `output_text` field is accepted as a fallback.
/// Whitespace-only text counts as no output.
pub fn extract_output_text(response: &ResponsesResponse) -> Option<String> {
    for item in &response.output {
        let part = item
            .content
            .iter()
            .find(|part| part.kind == "output_text" && part.text.is_some());
        if let Some(part) = part {
            let text = part.text.as_deref().unwrap_or_default().trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    response
        .output_text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                serde_json::Value::Object(map) => map
                    .get("message")
                    .and_then(|message| message.as_str().map(str::to_owned)),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.trim().to_string()
    })
}

/// Condense an API error body into a single displayable line, preferring the
/// provider's own message when the body is JSON.
pub fn describe_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty response body>".to_string();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value) {
            if !summary.is_empty() {
                return summary;
            }
        }
    }

    trimmed.to_string()
}
