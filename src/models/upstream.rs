// Chat-completion API type definitions (OpenAI-compatible wire format)
// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One outbound call, built once per translate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

/// `POST <base>/chat/completions` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl From<&UpstreamRequest> for ChatCompletionRequest {
    fn from(req: &UpstreamRequest) -> Self {
        Self {
            model: req.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: req.prompt.clone(),
            }],
            stream: req.stream,
        }
    }
}

/// Pull `choices[0].message.content` out of a completion body.
///
/// Providers disagree on the rest of the schema, so the body is treated as a
/// loose document and only this one field is required.
pub fn extract_content(body: &Value) -> Option<&str> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let req = UpstreamRequest {
            model: "gpt-4-turbo".to_string(),
            prompt: "translate this".to_string(),
            stream: true,
        };
        let json = serde_json::to_value(ChatCompletionRequest::from(&req)).unwrap();
        assert_eq!(
            json,
            json!({
                "model": "gpt-4-turbo",
                "messages": [{ "role": "user", "content": "translate this" }],
                "stream": true
            })
        );
    }

    #[test]
    fn test_extract_content() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "bar()" } }],
            "usage": { "total_tokens": 3 }
        });
        assert_eq!(extract_content(&body), Some("bar()"));
    }

    #[test]
    fn test_extract_content_missing() {
        assert_eq!(extract_content(&json!({ "choices": [] })), None);
        assert_eq!(extract_content(&json!({ "choices": [{ "message": { "content": null } }] })), None);
        assert_eq!(extract_content(&json!("not an object")), None);
    }
}
