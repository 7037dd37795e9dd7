//! Translation between OpenAI-style chat completions and the Chatbot UI backend.
//!
//! All translation functions are pure (no I/O).

pub mod chatbot_ui_types;
pub mod openai_types;
pub mod request;
pub mod response;
pub mod translator;

pub use translator::{ChatbotUiTranslator, Translator};
