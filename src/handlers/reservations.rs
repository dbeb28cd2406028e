use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{AppError, StoreError};
use crate::models::{NewReservation, Reservation, ReservationPatch};
use crate::services::reservations::{self, CancelOutcome, UpdateOutcome};
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    if expected_token.is_empty() {
        return Ok(());
    }
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

fn soft_failure(error: &str) -> Json<Value> {
    Json(json!({ "success": false, "error": error }))
}

// POST /book
#[derive(Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct BookingRequest {
    pub business_id: String,
    pub datetime: String,
    pub party_size: i64,
    pub customer: Customer,
    pub phone: Option<String>,
    pub table: Option<String>,
    pub notes: Option<String>,
}

pub async fn book(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<Value>, AppError> {
    if request.party_size < 1 {
        return Err(AppError::BadRequest("party_size must be at least 1".to_string()));
    }

    let reservation = reservations::book(
        &state,
        NewReservation {
            business: request.business_id,
            datetime: request.datetime,
            party_size: request.party_size,
            customer_name: request.customer.name,
            customer_email: request.customer.email,
            phone: request.phone,
            table: request.table,
            notes: request.notes,
        },
    )?;

    let mut body = serde_json::to_value(&reservation).map_err(StoreError::from)?;
    body["success"] = json!(true);
    body["message"] = json!("Reservation saved successfully.");
    Ok(Json(body))
}

// POST /cancelReservation
#[derive(Deserialize)]
pub struct CancelRequest {
    pub reservation_id: Option<String>,
    pub customer_email: Option<String>,
}

pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<Value>, AppError> {
    let Some(reservation_id) = request.reservation_id.filter(|id| !id.trim().is_empty()) else {
        return Ok(soft_failure("Missing reservation_id"));
    };

    let outcome = reservations::cancel(&state, &reservation_id, request.customer_email.as_deref())?;
    Ok(match outcome {
        CancelOutcome::Cancelled => Json(json!({
            "success": true,
            "message": format!("Reservation {reservation_id} cancelled successfully."),
        })),
        CancelOutcome::NotFound => soft_failure("Reservation not found"),
        CancelOutcome::EmailMismatch => soft_failure("Email does not match reservation"),
    })
}

// POST /updateReservation
#[derive(Deserialize)]
pub struct UpdateRequest {
    pub reservation_id: Option<String>,
    #[serde(flatten)]
    pub patch: ReservationPatch,
}

pub async fn update_reservation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let Some(reservation_id) = request.reservation_id.filter(|id| !id.trim().is_empty()) else {
        return Ok(soft_failure("Missing reservation_id"));
    };
    if request.patch.is_empty() {
        return Ok(soft_failure("No fields to update"));
    }
    if request.patch.party_size.is_some_and(|n| n < 1) {
        return Ok(soft_failure("party_size must be at least 1"));
    }

    Ok(match reservations::update(&state, &reservation_id, &request.patch)? {
        UpdateOutcome::Updated(reservation) => Json(json!({
            "success": true,
            "message": format!("Reservation {reservation_id} updated successfully."),
            "reservation": reservation,
        })),
        UpdateOutcome::NotFound => soft_failure("Reservation not found"),
        UpdateOutcome::Cancelled => soft_failure("Reservation is cancelled"),
    })
}

// GET /getAvailability
#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub business_id: String,
    pub date: Option<String>,
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Json<Value> {
    Json(json!({
        "success": true,
        "business_id": query.business_id,
        "date": query.date.unwrap_or_else(|| "today".to_string()),
        "available_slots": state.config.availability_slots,
    }))
}

// GET /reservations
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(state.store.list()?))
}

// POST /resetReservations
pub async fn reset_reservations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let deleted = reservations::reset(&state)?;
    Ok(Json(json!({ "success": true, "deleted": deleted })))
}
