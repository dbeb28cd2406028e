use serde::Deserialize;

use crate::models::{BookingData, Intent};

#[derive(Deserialize)]
struct RawIntent {
    intent: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Best-effort detection of a structured intent inside a vendor reply.
///
/// Accepts bare JSON, JSON wrapped in markdown fences, or a JSON object
/// embedded in prose. Anything else (or an unrecognised intent name) is an
/// ordinary chat reply and yields `None`.
pub fn detect_intent(reply: &str) -> Option<Intent> {
    let raw = parse_raw(reply)?;

    match raw.intent.as_str() {
        "book_reservation" => {
            let data = if raw.data.is_null() {
                BookingData::default()
            } else {
                serde_json::from_value(raw.data).ok()?
            };
            Some(Intent::BookReservation(data))
        }
        "cancel_reservation" => raw.data["reservation_id"]
            .as_str()
            .filter(|id| !id.trim().is_empty())
            .map(|id| Intent::CancelReservation {
                reservation_id: id.trim().to_string(),
            }),
        other => {
            tracing::debug!(intent = other, "ignoring unrecognised intent");
            None
        }
    }
}

fn parse_raw(reply: &str) -> Option<RawIntent> {
    if let Ok(raw) = serde_json::from_str::<RawIntent>(reply) {
        return Some(raw);
    }

    let trimmed = reply.trim();
    let cleaned = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Ok(raw) = serde_json::from_str::<RawIntent>(cleaned) {
        return Some(raw);
    }

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<RawIntent>(&cleaned[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_booking() {
        let reply = r#"{"intent":"book_reservation","data":{"datetime":"2025-06-15T19:00","business_id":"bistro","party_size":"4","name":"Ana","email":"ana@example.com"}}"#;
        let Some(Intent::BookReservation(data)) = detect_intent(reply) else {
            panic!("expected booking intent");
        };
        assert_eq!(data.party_size, Some(4));
        assert_eq!(data.business_id.as_deref(), Some("bistro"));
        assert_eq!(data.phone, None);
    }

    #[test]
    fn test_detect_fenced_booking_without_data() {
        let reply = "```json\n{\"intent\":\"book_reservation\"}\n```";
        assert_eq!(
            detect_intent(reply),
            Some(Intent::BookReservation(BookingData::default()))
        );
    }

    #[test]
    fn test_detect_cancel_embedded_in_prose() {
        let reply = r#"Sure thing: {"intent":"cancel_reservation","data":{"reservation_id":"RES-42"}} done"#;
        assert_eq!(
            detect_intent(reply),
            Some(Intent::CancelReservation {
                reservation_id: "RES-42".to_string()
            })
        );
    }

    #[test]
    fn test_plain_and_malformed_replies_are_not_intents() {
        assert_eq!(detect_intent("What time would you like?"), None);
        assert_eq!(detect_intent(r#"{"intent":"book_reservation","data":"#), None);
        assert_eq!(detect_intent(r#"{"intent":"small_talk"}"#), None);
        assert_eq!(detect_intent(r#"{"intent":"cancel_reservation","data":{}}"#), None);
        assert_eq!(detect_intent("} backwards {"), None);
    }
}
