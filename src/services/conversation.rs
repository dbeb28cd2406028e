use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, Utc};

use crate::models::{Conversation, ConversationMessage};

const SESSION_TTL_MINUTES: i64 = 30;

/// Per-session sliding window of the last `max_turns` user/assistant turns.
pub struct ConversationWindow {
    max_turns: usize,
    sessions: Mutex<HashMap<String, Conversation>>,
}

impl ConversationWindow {
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Conversation>> {
        // The map is always left consistent, so a poisoned lock is still usable.
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Retained messages for `session_id`, oldest first. Expired sessions are dropped.
    pub fn history(&self, session_id: &str) -> Vec<ConversationMessage> {
        let now = Utc::now().naive_utc();
        let mut sessions = self.sessions();
        sessions.retain(|_, conv| conv.expires_at > now);
        sessions
            .get(session_id)
            .map(|conv| conv.messages.clone())
            .unwrap_or_default()
    }

    pub fn record_turn(&self, session_id: &str, user: &str, assistant: &str) {
        if self.max_turns == 0 {
            return;
        }

        let now = Utc::now().naive_utc();
        let mut sessions = self.sessions();
        let conv = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Conversation {
                session_id: session_id.to_string(),
                messages: vec![],
                last_activity: now,
                expires_at: now,
            });

        conv.messages.push(ConversationMessage::user(user));
        conv.messages.push(ConversationMessage::assistant(assistant));

        let limit = self.max_turns * 2;
        if conv.messages.len() > limit {
            let excess = conv.messages.len() - limit;
            conv.messages.drain(..excess);
        }

        conv.last_activity = now;
        conv.expires_at = now + Duration::minutes(SESSION_TTL_MINUTES);
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }
}

/// Flattens a window into a plain prompt block, one `role: content` line per message.
pub fn transcript(messages: &[ConversationMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            let speaker = match m.role.as_str() {
                "user" => "User",
                "assistant" => "Assistant",
                other => other,
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keeps_last_turns() {
        let window = ConversationWindow::new(2);
        for i in 0..5 {
            window.record_turn("s1", &format!("q{i}"), &format!("a{i}"));
        }

        let history = window.history("s1");
        assert_eq!(history.len(), 4);
        assert_eq!(history[0], ConversationMessage::user("q3"));
        assert_eq!(history[3], ConversationMessage::assistant("a4"));
        assert!(window.history("other").is_empty());
    }

    #[test]
    fn test_zero_turns_disables_history() {
        let window = ConversationWindow::new(0);
        window.record_turn("s1", "hi", "hello");
        assert!(window.history("s1").is_empty());
        assert_eq!(window.session_count(), 0);
    }

    #[test]
    fn test_expired_sessions_are_dropped() {
        let window = ConversationWindow::new(3);
        window.record_turn("s1", "hi", "hello");
        {
            let mut sessions = window.sessions();
            let conv = sessions.get_mut("s1").unwrap();
            conv.expires_at = Utc::now().naive_utc() - Duration::minutes(1);
        }
        assert!(window.history("s1").is_empty());
        assert_eq!(window.session_count(), 0);
    }

    #[test]
    fn test_transcript() {
        let messages = vec![
            ConversationMessage::user("table for 2?"),
            ConversationMessage::assistant("What time?"),
        ];
        assert_eq!(transcript(&messages), "User: table for 2?\nAssistant: What time?");
    }
}
