use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::{require, ChatProvider, ChatReply, ChatRequest};
use crate::errors::AppError;

const NO_RESPONSE: &str = "⚠️ No response from Chatbase.";

pub struct ChatbaseProvider {
    api_key: String,
    agent_id: String,
    url: String,
    client: reqwest::Client,
}

impl ChatbaseProvider {
    pub fn new(api_key: String, agent_id: String, url: String) -> Self {
        Self {
            api_key,
            agent_id,
            url,
            client: reqwest::Client::new(),
        }
    }
}

fn build_payload(agent_id: &str, request: &ChatRequest<'_>) -> serde_json::Value {
    let mut payload = json!({
        "agent_id": agent_id,
        "messages": request.messages,
    });
    if let Some(session_id) = request.session_id.filter(|s| !s.is_empty()) {
        payload["session_id"] = json!(session_id);
    }
    if let Some(user_id) = request.user_id.filter(|s| !s.is_empty()) {
        payload["user_id"] = json!(user_id);
    }
    payload
}

fn extract_reply(raw: &serde_json::Value) -> String {
    ["reply", "response", "text"]
        .iter()
        .filter_map(|key| raw[*key].as_str())
        .find(|s| !s.is_empty())
        .unwrap_or(NO_RESPONSE)
        .to_string()
}

#[async_trait]
impl ChatProvider for ChatbaseProvider {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatReply, AppError> {
        let api_key = require("CHATBASE_API_KEY", &self.api_key)?;
        let agent_id = require("CHATBASE_AGENT_ID", &self.agent_id)?;

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(20))
            .json(&build_payload(agent_id, &request))
            .send()
            .await
            .map_err(|e| AppError::Ai(format!("failed to call Chatbase: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Ai(format!("Chatbase returned {status}: {body}")));
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| AppError::Ai(format!("failed to parse Chatbase response: {e}")))?;

        Ok(ChatReply {
            text: extract_reply(&raw),
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConversationMessage;

    #[test]
    fn test_payload_skips_missing_ids() {
        let messages = vec![ConversationMessage::user("table for two")];
        let request = ChatRequest {
            messages: &messages,
            session_id: None,
            user_id: Some(""),
        };
        let payload = build_payload("agent-1", &request);
        assert_eq!(payload["agent_id"], "agent-1");
        assert_eq!(payload["messages"][0]["role"], "user");
        assert!(payload.get("session_id").is_none());
        assert!(payload.get("user_id").is_none());
    }

    #[test]
    fn test_extract_reply_falls_back() {
        assert_eq!(extract_reply(&json!({"response": "hi"})), "hi");
        assert_eq!(extract_reply(&json!({"reply": "", "text": "yo"})), "yo");
        assert_eq!(extract_reply(&json!({})), NO_RESPONSE);
    }

    #[tokio::test]
    async fn test_missing_key_fails_at_call_time() {
        let provider = ChatbaseProvider::new(String::new(), "agent".into(), "http://127.0.0.1:9".into());
        let err = provider
            .chat(ChatRequest {
                messages: &[],
                session_id: None,
                user_id: None,
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("CHATBASE_API_KEY"));
    }
}
