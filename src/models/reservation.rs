use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub reservation_id: String,
    pub datetime: String,
    pub business: String,
    pub party_size: i64,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Reservation {
    /// Fresh `RES-` identifier. Collision-free under concurrent bookings.
    pub fn generate_id() -> String {
        format!("RES-{}", uuid::Uuid::new_v4().simple()).to_uppercase()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
    Updated,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Updated => "updated",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "cancelled" => ReservationStatus::Cancelled,
            "updated" => ReservationStatus::Updated,
            _ => ReservationStatus::Confirmed,
        }
    }
}

/// Everything a caller supplies when booking; id, status and timestamp are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub business: String,
    pub datetime: String,
    pub party_size: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub phone: Option<String>,
    pub table: Option<String>,
    pub notes: Option<String>,
}

impl NewReservation {
    pub fn into_reservation(self) -> Reservation {
        Reservation {
            reservation_id: Reservation::generate_id(),
            datetime: self.datetime,
            business: self.business,
            party_size: self.party_size,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            phone: self.phone,
            table: self.table,
            notes: self.notes,
            status: ReservationStatus::Confirmed,
            created_at: Some(
                chrono::Utc::now()
                    .naive_utc()
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            ),
        }
    }
}

/// Field overwrite applied by `/updateReservation`. `None` leaves a field alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationPatch {
    pub datetime: Option<String>,
    pub party_size: Option<i64>,
    pub phone: Option<String>,
    pub table: Option<String>,
    pub notes: Option<String>,
}

impl ReservationPatch {
    pub fn is_empty(&self) -> bool {
        self.datetime.is_none()
            && self.party_size.is_none()
            && self.phone.is_none()
            && self.table.is_none()
            && self.notes.is_none()
    }

    /// Overwrites the provided fields and marks the reservation `updated`.
    /// Cancelled reservations are left untouched and `false` is returned.
    pub fn apply(&self, reservation: &mut Reservation) -> bool {
        if reservation.status == ReservationStatus::Cancelled {
            return false;
        }
        if let Some(datetime) = &self.datetime {
            reservation.datetime = datetime.clone();
        }
        if let Some(party_size) = self.party_size {
            reservation.party_size = party_size;
        }
        if let Some(phone) = &self.phone {
            reservation.phone = Some(phone.clone());
        }
        if let Some(table) = &self.table {
            reservation.table = Some(table.clone());
        }
        if let Some(notes) = &self.notes {
            reservation.notes = Some(notes.clone());
        }
        reservation.status = ReservationStatus::Updated;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Reservation::generate_id();
        let b = Reservation::generate_id();
        assert!(a.starts_with("RES-"));
        assert_eq!(a.len(), 36);
        assert_ne!(a, b);
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let reservation = Reservation {
            reservation_id: "RES-1".to_string(),
            datetime: "2025-06-15T19:00".to_string(),
            business: "bistro".to_string(),
            party_size: 4,
            customer_name: "Ana".to_string(),
            customer_email: "ana@example.com".to_string(),
            phone: None,
            table: None,
            notes: None,
            status: ReservationStatus::Confirmed,
            created_at: None,
        };
        let json = serde_json::to_value(&reservation).unwrap();
        assert_eq!(json["status"], "confirmed");
        assert!(json.get("phone").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_patch_marks_updated() {
        let mut reservation: Reservation = serde_json::from_str(
            r#"{"reservation_id":"RES-1","datetime":"2025-06-15T19:00","business":"bistro","party_size":2,"customer_name":"Ana","customer_email":"ana@example.com","status":"confirmed"}"#,
        )
        .unwrap();
        let patch = ReservationPatch {
            party_size: Some(6),
            ..Default::default()
        };
        assert!(patch.apply(&mut reservation));
        assert_eq!(reservation.party_size, 6);
        assert_eq!(reservation.datetime, "2025-06-15T19:00");
        assert_eq!(reservation.status, ReservationStatus::Updated);
    }

    #[test]
    fn test_patch_leaves_cancelled_alone() {
        let mut reservation: Reservation = serde_json::from_str(
            r#"{"reservation_id":"RES-1","datetime":"2025-06-15T19:00","business":"bistro","party_size":2,"customer_name":"Ana","customer_email":"ana@example.com","status":"cancelled"}"#,
        )
        .unwrap();
        let before = reservation.clone();
        let patch = ReservationPatch {
            party_size: Some(6),
            ..Default::default()
        };
        assert!(!patch.apply(&mut reservation));
        assert_eq!(reservation, before);
    }
}
