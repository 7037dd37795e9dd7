//! Type definitions for the caller-facing side, a subset of the
//! [OpenAI Chat Completions API](https://platform.openai.com/docs/api-reference/chat).
//!
//! Only the fields the bridge reads or writes are modelled. Missing scalar
//! fields in a request fall back to their zero values.

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Request types (what the caller sends TO us)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    /// Accepted for compatibility; the backend model is fixed.
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub stream: bool,
}

/// One conversation turn. The role is passed through unvalidated, and a
/// `null` role or content reads as an empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

// ---------------------------------------------------------------------------
// Response types (what we send BACK to the caller)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
    pub message: ChatMessage,
}

// ---------------------------------------------------------------------------
// Model listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelCard {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub owned_by: String,
}

// ---------------------------------------------------------------------------
// Error body
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_missing_scalars() {
        let req: ChatCompletionRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert_eq!(req.model, "");
        assert!(!req.stream);
        assert!(req.temperature.abs() < f64::EPSILON);
        assert_eq!(req.messages, vec![ChatMessage::new("user", "hi")]);
    }

    #[test]
    fn test_null_message_fields_read_as_empty() {
        let req: ChatCompletionRequest = serde_json::from_str(
            r#"{"messages":[{"role":"user","content":null},{"role":null,"content":"x"}]}"#,
        )
        .unwrap();
        assert_eq!(req.messages[0], ChatMessage::new("user", ""));
        assert_eq!(req.messages[1], ChatMessage::new("", "x"));
    }

    #[test]
    fn test_non_string_content_still_rejected() {
        let parsed = serde_json::from_str::<ChatCompletionRequest>(
            r#"{"messages":[{"role":"user","content":42}]}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_response_wire_shape() {
        let resp = ChatCompletionResponse {
            choices: vec![Choice {
                message: ChatMessage::assistant("ok"),
            }],
        };
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#
        );
    }
}
