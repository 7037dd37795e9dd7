//! The translation strategy the relay is parameterised over.

use super::openai_types::{ChatCompletionRequest, ChatCompletionResponse};
use super::request::openai_to_chatbot_ui;
use super::response::{chatbot_ui_to_openai, parse_backend_body};
use crate::error::Result;

/// Maps inbound requests to a backend body and buffered backend replies back
/// to the inbound response shape. Streaming replies never pass through here.
pub trait Translator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// `Content-Type` of the outbound request.
    fn content_type(&self) -> &'static str;

    fn encode_request(&self, req: &ChatCompletionRequest) -> Result<Vec<u8>>;

    fn decode_response(&self, body: &[u8]) -> ChatCompletionResponse;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatbotUiTranslator;

impl Translator for ChatbotUiTranslator {
    fn name(&self) -> &'static str {
        "chatbot-ui"
    }

    fn content_type(&self) -> &'static str {
        "text/plain;charset=UTF-8"
    }

    fn encode_request(&self, req: &ChatCompletionRequest) -> Result<Vec<u8>> {
        let outbound = openai_to_chatbot_ui(req)?;
        Ok(serde_json::to_vec(&outbound)?)
    }

    fn decode_response(&self, body: &[u8]) -> ChatCompletionResponse {
        chatbot_ui_to_openai(&parse_backend_body(body))
    }
}
