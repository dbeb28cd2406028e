use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use super::ReservationStore;
use crate::db::queries;
use crate::errors::StoreError;
use crate::models::{Reservation, ReservationPatch, ReservationStatus};

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl ReservationStore for SqliteStore {
    fn add(&self, reservation: &Reservation) -> Result<(), StoreError> {
        let conn = self.lock()?;
        queries::insert_reservation(&conn, reservation)
    }

    fn list(&self) -> Result<Vec<Reservation>, StoreError> {
        let conn = self.lock()?;
        queries::list_reservations(&conn)
    }

    fn get(&self, reservation_id: &str) -> Result<Option<Reservation>, StoreError> {
        let conn = self.lock()?;
        queries::get_reservation(&conn, reservation_id)
    }

    fn set_status(&self, reservation_id: &str, status: ReservationStatus) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        queries::update_status(&conn, reservation_id, status)
    }

    fn update(
        &self,
        reservation_id: &str,
        patch: &ReservationPatch,
    ) -> Result<Option<Reservation>, StoreError> {
        let conn = self.lock()?;
        queries::apply_patch(&conn, reservation_id, patch)
    }

    fn reset(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        queries::delete_all_reservations(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::contract;

    #[test]
    fn test_sqlite_store_contract() {
        let store = SqliteStore::new(db::init_db(":memory:").unwrap());
        contract::exercise(&store);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = SqliteStore::new(db::init_db(":memory:").unwrap());
        let reservation = contract::sample("RES-DUP", "2025-06-15T18:00");
        store.add(&reservation).unwrap();
        assert!(matches!(store.add(&reservation), Err(StoreError::Database(_))));
    }
}
