use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tablebridge::config::{AppConfig, StorageBackend};
use tablebridge::db;
use tablebridge::routes;
use tablebridge::services::ai::chatbase::ChatbaseProvider;
use tablebridge::services::ai::openai::OpenAiProvider;
use tablebridge::services::ai::ChatProvider;
use tablebridge::state::AppState;
use tablebridge::store::{JsonFileStore, ReservationStore, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store: Box<dyn ReservationStore> = match config.storage_backend {
        StorageBackend::Sqlite => {
            tracing::info!("using SQLite reservation store ({})", config.database_url);
            Box::new(SqliteStore::new(db::init_db(&config.database_url)?))
        }
        StorageBackend::Json => {
            tracing::info!("using JSON file reservation store ({})", config.reservations_file);
            Box::new(JsonFileStore::new(&config.reservations_file))
        }
    };

    let chat: Box<dyn ChatProvider> = match config.chat_provider.as_str() {
        "openai" => {
            tracing::info!("using OpenAI-compatible chat provider (model: {})", config.openai_model);
            Box::new(OpenAiProvider::new(
                config.openai_api_key.clone(),
                config.openai_model.clone(),
                config.openai_api_url.clone(),
            ))
        }
        _ => {
            if config.chatbase_api_key.is_empty() || config.chatbase_agent_id.is_empty() {
                tracing::warn!("CHATBASE_API_KEY / CHATBASE_AGENT_ID not set, chat calls will fail");
            }
            tracing::info!("using Chatbase chat provider");
            Box::new(ChatbaseProvider::new(
                config.chatbase_api_key.clone(),
                config.chatbase_agent_id.clone(),
                config.chatbase_api_url.clone(),
            ))
        }
    };

    let port = config.port;
    let state = Arc::new(AppState::new(config, store, chat));
    let app = routes::router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
