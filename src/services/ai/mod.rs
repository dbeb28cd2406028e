pub mod chatbase;
pub mod intent;
pub mod openai;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::ConversationMessage;

/// One call to the chat vendor: retained window plus the new user message last.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub messages: &'a [ConversationMessage],
    pub session_id: Option<&'a str>,
    pub user_id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatReply, AppError>;
}

pub(crate) fn require<'a>(name: &str, value: &'a str) -> Result<&'a str, AppError> {
    if value.is_empty() {
        return Err(AppError::Config(format!("missing required env var: {name}")));
    }
    Ok(value)
}
