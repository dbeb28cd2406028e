use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard::dashboard))
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route("/ws", get(handlers::dashboard::ws_upgrade))
        .route("/ping", get(handlers::health::ping))
        .route("/book", post(handlers::reservations::book))
        .route(
            "/cancelReservation",
            post(handlers::reservations::cancel_reservation),
        )
        .route(
            "/updateReservation",
            post(handlers::reservations::update_reservation),
        )
        .route(
            "/getAvailability",
            get(handlers::reservations::get_availability),
        )
        .route(
            "/resetReservations",
            post(handlers::reservations::reset_reservations),
        )
        .route(
            "/reservations",
            get(handlers::reservations::list_reservations),
        )
        .route("/process_message", post(handlers::chat::process_message))
        .route("/chatbase_bridge", post(handlers::chat::chatbase_bridge))
        .route("/whatsapp", post(handlers::whatsapp::whatsapp_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
