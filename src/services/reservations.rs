use std::sync::Arc;

use chrono::Local;

use crate::errors::AppError;
use crate::models::{
    BookingData, NewReservation, RefreshNotice, RefreshReason, Reservation, ReservationPatch,
    ReservationStatus,
};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    Cancelled,
    NotFound,
    EmailMismatch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Reservation),
    NotFound,
    Cancelled,
}

pub fn book(state: &Arc<AppState>, new: NewReservation) -> Result<Reservation, AppError> {
    let reservation = new.into_reservation();
    state.store.add(&reservation)?;

    tracing::info!(
        reservation_id = %reservation.reservation_id,
        business = %reservation.business,
        datetime = %reservation.datetime,
        party_size = reservation.party_size,
        "reservation created"
    );
    notify(state, RefreshReason::Created, Some(&reservation.reservation_id));

    Ok(reservation)
}

/// Flips a reservation to `cancelled`. When `customer_email` is given it must
/// match the stored one (case-insensitive).
pub fn cancel(
    state: &Arc<AppState>,
    reservation_id: &str,
    customer_email: Option<&str>,
) -> Result<CancelOutcome, AppError> {
    if let Some(email) = customer_email.map(str::trim).filter(|e| !e.is_empty()) {
        match state.store.get(reservation_id)? {
            None => return Ok(CancelOutcome::NotFound),
            Some(existing) if !existing.customer_email.eq_ignore_ascii_case(email) => {
                tracing::warn!(reservation_id, "cancel rejected: email mismatch");
                return Ok(CancelOutcome::EmailMismatch);
            }
            Some(_) => {}
        }
    }

    if !state
        .store
        .set_status(reservation_id, ReservationStatus::Cancelled)?
    {
        tracing::warn!(reservation_id, "cancel requested for unknown reservation");
        return Ok(CancelOutcome::NotFound);
    }

    tracing::info!(reservation_id, "reservation cancelled");
    notify(state, RefreshReason::Cancelled, Some(reservation_id));
    Ok(CancelOutcome::Cancelled)
}

/// Patches a reservation. Cancelled reservations stay cancelled.
pub fn update(
    state: &Arc<AppState>,
    reservation_id: &str,
    patch: &ReservationPatch,
) -> Result<UpdateOutcome, AppError> {
    let outcome = match state.store.update(reservation_id, patch)? {
        None => UpdateOutcome::NotFound,
        Some(r) if r.status == ReservationStatus::Cancelled => {
            tracing::warn!(reservation_id, "update rejected: reservation is cancelled");
            UpdateOutcome::Cancelled
        }
        Some(r) => {
            tracing::info!(reservation_id, "reservation updated");
            notify(state, RefreshReason::Updated, Some(reservation_id));
            UpdateOutcome::Updated(r)
        }
    };
    Ok(outcome)
}

pub fn reset(state: &Arc<AppState>) -> Result<usize, AppError> {
    let deleted = state.store.reset()?;
    tracing::warn!(deleted, "all reservations deleted");
    notify(state, RefreshReason::Reset, None);
    Ok(deleted)
}

/// Maps a vendor booking intent onto a reservation, filling the usual defaults.
/// Party sizes below one are rejected the same way `/book` rejects them.
pub fn from_intent(data: BookingData) -> Result<NewReservation, AppError> {
    let party_size = data.party_size.unwrap_or(2);
    if party_size < 1 {
        return Err(AppError::BadRequest(format!(
            "party_size must be at least 1, got {party_size}"
        )));
    }

    Ok(NewReservation {
        business: non_empty(data.business_id).unwrap_or_else(|| "DefaultBiz".to_string()),
        datetime: non_empty(data.datetime)
            .unwrap_or_else(|| Local::now().format("%Y-%m-%dT%H:%M").to_string()),
        party_size,
        customer_name: non_empty(data.name).unwrap_or_else(|| "Guest".to_string()),
        customer_email: non_empty(data.email).unwrap_or_else(|| "guest@example.com".to_string()),
        phone: non_empty(data.phone),
        table: non_empty(data.table),
        notes: non_empty(data.notes),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn notify(state: &AppState, reason: RefreshReason, reservation_id: Option<&str>) {
    let notice = RefreshNotice::new(reason, reservation_id.map(str::to_string));
    // No dashboards connected is fine
    let _ = state.events.send(notice);
}
