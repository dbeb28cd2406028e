pub mod json_file;
pub mod sqlite;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

use crate::errors::StoreError;
use crate::models::{Reservation, ReservationPatch, ReservationStatus};

/// Persistence seam shared by the SQLite table and the flat JSON file.
pub trait ReservationStore: Send + Sync {
    fn add(&self, reservation: &Reservation) -> Result<(), StoreError>;

    /// All reservations, newest `datetime` first.
    fn list(&self) -> Result<Vec<Reservation>, StoreError>;

    fn get(&self, reservation_id: &str) -> Result<Option<Reservation>, StoreError>;

    /// Returns `false` when no reservation has that id.
    fn set_status(&self, reservation_id: &str, status: ReservationStatus) -> Result<bool, StoreError>;

    /// Returns the patched reservation, or `None` when the id is unknown.
    /// A cancelled reservation comes back unchanged and is not written.
    fn update(
        &self,
        reservation_id: &str,
        patch: &ReservationPatch,
    ) -> Result<Option<Reservation>, StoreError>;

    /// Deletes everything, returning the number of removed reservations.
    fn reset(&self) -> Result<usize, StoreError>;
}
