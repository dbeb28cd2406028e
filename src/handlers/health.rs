use axum::Json;
use chrono::Local;
use serde_json::{json, Value};

// GET /ping
pub async fn ping() -> Json<Value> {
    Json(json!({
        "status": "✅ Online",
        "time": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }))
}
