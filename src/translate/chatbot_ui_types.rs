//! Type definitions for the Chatbot UI backend chat route.
//!
//! The backend takes a `chatSettings` object plus the raw message list, and
//! answers with plain text (or a `{"content": ...}` object).

use serde::{Deserialize, Serialize};

use super::openai_types::ChatMessage;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotUiRequest {
    pub chat_settings: ChatSettings,
    pub messages: Vec<ChatMessage>,
    pub custom_model_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSettings {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
    pub context_length: u32,
    pub include_profile_context: bool,
    pub include_workspace_instructions: bool,
    pub embeddings_provider: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatbotUiResponse {
    pub content: String,
}
