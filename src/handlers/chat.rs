use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::services::bridge;
use crate::state::AppState;

// POST /process_message
#[derive(Deserialize)]
pub struct ProcessMessageRequest {
    #[serde(default)]
    pub message: String,
}

/// Canned keyword replies, no vendor call. Handy for wiring tests.
pub async fn process_message(Json(request): Json<ProcessMessageRequest>) -> Json<Value> {
    let message = request.message.to_lowercase();
    tracing::info!(message = %message, "message received");

    let reply = if message.contains("book") {
        "Got it! How many people and what time?"
    } else if message.contains("cancel") {
        "Sure, please provide your reservation ID."
    } else {
        "I'm your restaurant assistant: you can say 'book a table' or 'cancel my booking'."
    };
    Json(json!({ "reply": reply }))
}

// POST /chatbase_bridge
#[derive(Deserialize)]
pub struct BridgeRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct BridgeResponse {
    pub reply: String,
    pub raw: Value,
}

pub async fn chatbase_bridge(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BridgeRequest>,
) -> Json<BridgeResponse> {
    let result = bridge::relay_message(
        &state,
        &request.message,
        request.session_id.as_deref(),
        request.user_id.as_deref(),
    )
    .await;

    match result {
        Ok(outcome) => Json(BridgeResponse {
            reply: outcome.reply,
            raw: outcome.raw,
        }),
        Err(e) => {
            tracing::error!(error = %e, "chat bridge failed");
            Json(BridgeResponse {
                reply: format!("⚠️ Error: {e}"),
                raw: json!({}),
            })
        }
    }
}
