use serde::Deserialize;

/// Structured hint a vendor may embed in a chat reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    BookReservation(BookingData),
    CancelReservation { reservation_id: String },
}

/// `data` object of a `book_reservation` intent. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BookingData {
    pub datetime: Option<String>,
    pub business_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub party_size: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub table: Option<String>,
    pub notes: Option<String>,
}

// Vendors send party_size as 4, 4.0 or "4". Fractions and junk are rejected
// so the whole intent is ignored rather than guessed at.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match &value {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("party_size is not a whole number: {}", value.unwrap_or_default())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(raw: serde_json::Value) -> Result<Option<i64>, serde_json::Error> {
        serde_json::from_value::<BookingData>(serde_json::json!({ "party_size": raw }))
            .map(|d| d.party_size)
    }

    #[test]
    fn test_party_size_accepts_whole_numbers() {
        assert_eq!(party(serde_json::json!(4)).unwrap(), Some(4));
        assert_eq!(party(serde_json::json!(4.0)).unwrap(), Some(4));
        assert_eq!(party(serde_json::json!(" 6 ")).unwrap(), Some(6));
        assert_eq!(party(serde_json::Value::Null).unwrap(), None);
    }

    #[test]
    fn test_party_size_rejects_fractions_and_text() {
        assert!(party(serde_json::json!(4.7)).is_err());
        assert!(party(serde_json::json!("four")).is_err());
        assert!(party(serde_json::json!([4])).is_err());
    }
}
