use super::chatbot_ui_types::ChatbotUiResponse;
use super::openai_types::{ChatCompletionResponse, ChatMessage, Choice};

/// Wrap backend text as a single assistant choice.
pub fn chatbot_ui_to_openai(resp: &ChatbotUiResponse) -> ChatCompletionResponse {
    ChatCompletionResponse {
        choices: vec![Choice {
            message: ChatMessage::assistant(resp.content.clone()),
        }],
    }
}

/// Read a buffered backend body. A `{"content": ...}` object yields its
/// content; anything else is taken verbatim as the reply text.
pub fn parse_backend_body(body: &[u8]) -> ChatbotUiResponse {
    serde_json::from_slice::<ChatbotUiResponse>(body).unwrap_or_else(|_| ChatbotUiResponse {
        content: String::from_utf8_lossy(body).into_owned(),
    })
}
