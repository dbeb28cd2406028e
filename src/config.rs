use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Json,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub database_url: String,
    pub reservations_file: String,
    pub chat_provider: String,
    pub chatbase_api_key: String,
    pub chatbase_agent_id: String,
    pub chatbase_api_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,
    pub chat_history_turns: usize,
    pub availability_slots: Vec<String>,
    pub twilio_auth_token: String,
    pub admin_token: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            storage_backend: match env::var("STORAGE_BACKEND").as_deref() {
                Ok("json") => StorageBackend::Json,
                _ => StorageBackend::Sqlite,
            },
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "reservations.db".to_string()),
            reservations_file: env::var("RESERVATIONS_FILE")
                .unwrap_or_else(|_| "reservations.json".to_string()),
            chat_provider: env::var("CHAT_PROVIDER").unwrap_or_else(|_| "chatbase".to_string()),
            chatbase_api_key: env::var("CHATBASE_API_KEY").unwrap_or_default(),
            chatbase_agent_id: env::var("CHATBASE_AGENT_ID").unwrap_or_default(),
            chatbase_api_url: env::var("CHATBASE_API_URL")
                .unwrap_or_else(|_| "https://www.chatbase.co/api/v1/chat".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            chat_history_turns: env::var("CHAT_HISTORY_TURNS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            availability_slots: env::var("AVAILABILITY_SLOTS")
                .map(|v| parse_slots(&v))
                .unwrap_or_else(|_| default_slots()),
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_default(),
        }
    }
}

pub fn default_slots() -> Vec<String> {
    ["18:00", "19:00", "20:00", "21:00"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn parse_slots(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slots_trims_and_skips_empty() {
        assert_eq!(parse_slots(" 12:00, 13:30,,"), vec!["12:00", "13:30"]);
    }
}
