//! Translate OpenAI-style chat completion requests into Chatbot UI requests.

use super::chatbot_ui_types::{ChatSettings, ChatbotUiRequest};
use super::openai_types::ChatCompletionRequest;
use crate::error::{BridgeError, Result};

/// Model name sent to the backend, whatever the caller asked for.
pub const BACKEND_MODEL: &str = "gpt-4o";
pub const CONTEXT_LENGTH: u32 = 4096;
pub const EMBEDDINGS_PROVIDER: &str = "openai";

/// Translate an inbound request into the backend shape.
/// Pure function: the prompt is the first message's content and the inbound
/// `model` is ignored. Fails only when there is no first message.
pub fn openai_to_chatbot_ui(req: &ChatCompletionRequest) -> Result<ChatbotUiRequest> {
    let first = req
        .messages
        .first()
        .ok_or_else(|| BridgeError::translation("request has no messages"))?;

    Ok(ChatbotUiRequest {
        chat_settings: ChatSettings {
            model: BACKEND_MODEL.to_string(),
            prompt: first.content.clone(),
            temperature: req.temperature,
            context_length: CONTEXT_LENGTH,
            include_profile_context: true,
            include_workspace_instructions: true,
            embeddings_provider: EMBEDDINGS_PROVIDER.to_string(),
        },
        messages: req.messages.clone(),
        custom_model_id: String::new(),
    })
}
