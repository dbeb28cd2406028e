use serde::Serialize;

/// Pushed to every dashboard socket after a reservation changes.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RefreshNotice {
    pub event: &'static str,
    pub reason: RefreshReason,
    pub reservation_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RefreshReason {
    Created,
    Cancelled,
    Updated,
    Reset,
}

impl RefreshNotice {
    pub fn new(reason: RefreshReason, reservation_id: Option<String>) -> Self {
        Self {
            event: "refresh",
            reason,
            reservation_id,
        }
    }
}
