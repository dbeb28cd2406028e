use std::sync::Arc;

use crate::errors::AppError;
use crate::models::{ConversationMessage, Intent, Reservation};
use crate::services::ai::intent::detect_intent;
use crate::services::ai::ChatRequest;
use crate::services::reservations::{self, CancelOutcome};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct BridgeOutcome {
    pub reply: String,
    pub raw: serde_json::Value,
    pub reservation: Option<Reservation>,
}

/// Sends `message` (plus the session window) to the chat vendor and acts on
/// any intent found in the reply.
pub async fn relay_message(
    state: &Arc<AppState>,
    message: &str,
    session_id: Option<&str>,
    user_id: Option<&str>,
) -> Result<BridgeOutcome, AppError> {
    let session_id = session_id.map(str::trim).filter(|s| !s.is_empty());

    let mut messages = session_id
        .map(|id| state.conversations.history(id))
        .unwrap_or_default();
    messages.push(ConversationMessage::user(message));

    let chat_reply = state
        .chat
        .chat(ChatRequest {
            messages: &messages,
            session_id,
            user_id,
        })
        .await?;

    let mut outcome = BridgeOutcome {
        reply: chat_reply.text,
        raw: chat_reply.raw,
        reservation: None,
    };

    match detect_intent(&outcome.reply) {
        Some(Intent::BookReservation(data)) => {
            match reservations::from_intent(data).and_then(|new| reservations::book(state, new)) {
                Ok(reservation) => {
                    outcome.reply = format!(
                        "✅ Reservation created for {} on {} for {} people.",
                        reservation.customer_name, reservation.datetime, reservation.party_size
                    );
                    outcome.reservation = Some(reservation);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "booking intent not applied");
                }
            }
        }
        Some(Intent::CancelReservation { reservation_id }) => {
            match reservations::cancel(state, &reservation_id, None) {
                Ok(CancelOutcome::Cancelled) => {
                    outcome.reply = format!("✅ Reservation {reservation_id} has been cancelled.");
                }
                Ok(_) => {
                    outcome.reply = format!("⚠️ I couldn't find reservation {reservation_id}.");
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to cancel reservation from chat intent");
                }
            }
        }
        None => {}
    }

    if let Some(id) = session_id {
        state.conversations.record_turn(id, message, &outcome.reply);
    }

    tracing::info!(
        session_id = session_id.unwrap_or("-"),
        booked = outcome.reservation.is_some(),
        "chat message relayed"
    );

    Ok(outcome)
}
