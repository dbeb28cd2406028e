use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::StoreError;
use crate::models::{Reservation, ReservationPatch, ReservationStatus};

const RESERVATION_COLUMNS: &str = "reservation_id, datetime, business, party_size, customer_name, customer_email, phone, table_label, notes, status, created_at";

pub fn insert_reservation(conn: &Connection, reservation: &Reservation) -> Result<(), StoreError> {
    let created_at = reservation
        .created_at
        .clone()
        .unwrap_or_else(|| Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string());

    conn.execute(
        "INSERT INTO reservations (reservation_id, datetime, business, party_size, customer_name, customer_email, phone, table_label, notes, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            reservation.reservation_id,
            reservation.datetime,
            reservation.business,
            reservation.party_size,
            reservation.customer_name,
            reservation.customer_email,
            reservation.phone,
            reservation.table,
            reservation.notes,
            reservation.status.as_str(),
            created_at,
        ],
    )?;
    Ok(())
}

pub fn list_reservations(conn: &Connection) -> Result<Vec<Reservation>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations ORDER BY datetime DESC, id DESC"
    ))?;

    let rows = stmt.query_map([], parse_reservation_row)?;

    let mut reservations = vec![];
    for row in rows {
        reservations.push(row?);
    }
    Ok(reservations)
}

pub fn get_reservation(conn: &Connection, reservation_id: &str) -> Result<Option<Reservation>, StoreError> {
    let reservation = conn
        .query_row(
            &format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE reservation_id = ?1"),
            params![reservation_id],
            parse_reservation_row,
        )
        .optional()?;
    Ok(reservation)
}

pub fn update_status(
    conn: &Connection,
    reservation_id: &str,
    status: ReservationStatus,
) -> Result<bool, StoreError> {
    let count = conn.execute(
        "UPDATE reservations SET status = ?1 WHERE reservation_id = ?2",
        params![status.as_str(), reservation_id],
    )?;
    Ok(count > 0)
}

/// Read-modify-write inside one transaction so concurrent patches never interleave.
pub fn apply_patch(
    conn: &Connection,
    reservation_id: &str,
    patch: &ReservationPatch,
) -> Result<Option<Reservation>, StoreError> {
    let tx = conn.unchecked_transaction()?;

    let Some(mut reservation) = get_reservation(&tx, reservation_id)? else {
        return Ok(None);
    };
    if !patch.apply(&mut reservation) {
        return Ok(Some(reservation));
    }

    tx.execute(
        "UPDATE reservations SET datetime = ?1, party_size = ?2, phone = ?3, table_label = ?4, notes = ?5, status = ?6
         WHERE reservation_id = ?7",
        params![
            reservation.datetime,
            reservation.party_size,
            reservation.phone,
            reservation.table,
            reservation.notes,
            reservation.status.as_str(),
            reservation_id,
        ],
    )?;
    tx.commit()?;

    Ok(Some(reservation))
}

pub fn delete_all_reservations(conn: &Connection) -> Result<usize, StoreError> {
    let count = conn.execute("DELETE FROM reservations", [])?;
    Ok(count)
}

fn parse_reservation_row(row: &rusqlite::Row) -> rusqlite::Result<Reservation> {
    let status: String = row.get(9)?;
    Ok(Reservation {
        reservation_id: row.get(0)?,
        datetime: row.get(1)?,
        business: row.get(2)?,
        party_size: row.get(3)?,
        customer_name: row.get(4)?,
        customer_email: row.get(5)?,
        phone: row.get(6)?,
        table: row.get(7)?,
        notes: row.get(8)?,
        status: ReservationStatus::parse(&status),
        created_at: row.get(10)?,
    })
}
