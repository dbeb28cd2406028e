use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{require, ChatProvider, ChatReply, ChatRequest};
use crate::errors::AppError;
use crate::services::conversation::transcript;

const SYSTEM_PROMPT: &str = r#"You are the reservation assistant of a restaurant. Chat naturally with the guest.

When the guest has given everything needed to book a table (date and time, party size, name and email), reply with ONLY this JSON and nothing else:
{"intent":"book_reservation","data":{"business_id":"...","datetime":"YYYY-MM-DDTHH:MM","party_size":2,"name":"...","email":"...","phone":null,"notes":null}}

When the guest asks to cancel and gives a reservation id, reply with ONLY:
{"intent":"cancel_reservation","data":{"reservation_id":"RES-..."}}

Otherwise answer in plain text: ask for whatever is missing, keep it short and friendly.
"#;

/// Any OpenAI-compatible chat-completions endpoint.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, url: String) -> Self {
        Self {
            api_key,
            model,
            url,
            client: reqwest::Client::new(),
        }
    }

    async fn complete(&self, api_key: &str, request: &ChatRequest<'_>) -> anyhow::Result<serde_json::Value> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&build_body(&self.model, request))
            .send()
            .await
            .context("failed to call chat completions API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse chat completions response")?;

        if !status.is_success() {
            anyhow::bail!("chat completions API error ({}): {}", status, data);
        }

        Ok(data)
    }
}

fn build_body(model: &str, request: &ChatRequest<'_>) -> serde_json::Value {
    // Earlier turns ride along in the system prompt; only the latest goes as a message.
    let (latest, history) = match request.messages.split_last() {
        Some((latest, history)) => (latest.content.as_str(), history),
        None => ("", request.messages),
    };
    let system = if history.is_empty() {
        SYSTEM_PROMPT.to_string()
    } else {
        format!("{SYSTEM_PROMPT}\nConversation so far:\n{}", transcript(history))
    };

    let mut body = json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": latest },
        ],
        "temperature": 0.3,
    });
    if let Some(user_id) = request.user_id.filter(|u| !u.is_empty()) {
        body["user"] = json!(user_id);
    }
    body
}

fn extract_content(raw: &serde_json::Value) -> Result<String, AppError> {
    raw["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::Ai("missing content in chat completions response".to_string()))
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatReply, AppError> {
        let api_key = require("OPENAI_API_KEY", &self.api_key)?;

        let raw = self
            .complete(api_key, &request)
            .await
            .map_err(|e| AppError::Ai(format!("{e:#}")))?;

        Ok(ChatReply {
            text: extract_content(&raw)?,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConversationMessage;

    fn request(messages: &[ConversationMessage]) -> ChatRequest<'_> {
        ChatRequest {
            messages,
            session_id: Some("s1"),
            user_id: None,
        }
    }

    #[test]
    fn test_body_carries_history_in_system_prompt() {
        let messages = vec![
            ConversationMessage::user("hi"),
            ConversationMessage::assistant("How many guests?"),
            ConversationMessage::user("four"),
        ];
        let body = build_body("gpt-test", &request(&messages));

        assert_eq!(body["model"], "gpt-test");
        let sent = body["messages"].as_array().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1]["role"], "user");
        assert_eq!(sent[1]["content"], "four");

        let system = sent[0]["content"].as_str().unwrap();
        assert!(system.starts_with(SYSTEM_PROMPT));
        assert!(system.contains("Conversation so far:"));
        assert!(system.contains("How many guests?"));
        assert!(!system.contains("four"));
        assert!(body.get("user").is_none());
    }

    #[test]
    fn test_body_without_history() {
        let messages = vec![ConversationMessage::user("table tonight?")];
        let body = build_body("m", &request(&messages));
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["content"], "table tonight?");

        let body = build_body("m", &request(&[]));
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["content"], "");
    }

    #[test]
    fn test_body_includes_user_id() {
        let messages = vec![ConversationMessage::user("hi")];
        let body = build_body(
            "m",
            &ChatRequest {
                messages: &messages,
                session_id: None,
                user_id: Some("whatsapp:+1555"),
            },
        );
        assert_eq!(body["user"], "whatsapp:+1555");
    }

    #[test]
    fn test_extract_content() {
        let raw = json!({ "choices": [{ "message": { "role": "assistant", "content": "Sure!" } }] });
        assert_eq!(extract_content(&raw).unwrap(), "Sure!");

        let err = extract_content(&json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, AppError::Ai(_)));
    }

    #[tokio::test]
    async fn test_missing_key_fails_at_call_time() {
        let provider = OpenAiProvider::new(String::new(), "m".into(), "http://127.0.0.1:9".into());
        let err = provider.chat(request(&[])).await.unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
