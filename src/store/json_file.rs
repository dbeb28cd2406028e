use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use super::ReservationStore;
use crate::errors::StoreError;
use crate::models::{Reservation, ReservationPatch, ReservationStatus};

/// Reservations kept as one pretty-printed JSON array on disk.
///
/// Writers are serialized behind a mutex and every write goes to a sibling
/// temp file that is renamed over the target, so readers never see a torn file.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Reads the whole file. A missing file is an empty store; anything else
    /// unreadable is an error so writers never overwrite data they could not parse.
    fn load_strict(&self) -> Result<Vec<Reservation>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    // Readers degrade to an empty list.
    fn load(&self) -> Vec<Reservation> {
        self.load_strict().unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to load reservations file");
            vec![]
        })
    }

    fn save(&self, reservations: &[Reservation]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(reservations)?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn sorted(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
    // Stable sort keeps later inserts first among equal datetimes.
    reservations.reverse();
    reservations.sort_by(|a, b| b.datetime.cmp(&a.datetime));
    reservations
}

impl ReservationStore for JsonFileStore {
    fn add(&self, reservation: &Reservation) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let mut data = self.load_strict()?;
        data.push(reservation.clone());
        self.save(&data)
    }

    fn list(&self) -> Result<Vec<Reservation>, StoreError> {
        Ok(sorted(self.load()))
    }

    fn get(&self, reservation_id: &str) -> Result<Option<Reservation>, StoreError> {
        Ok(self
            .load()
            .into_iter()
            .find(|r| r.reservation_id == reservation_id))
    }

    fn set_status(&self, reservation_id: &str, status: ReservationStatus) -> Result<bool, StoreError> {
        let _guard = self.lock()?;
        let mut data = self.load_strict()?;
        let Some(reservation) = data.iter_mut().find(|r| r.reservation_id == reservation_id) else {
            return Ok(false);
        };
        reservation.status = status;
        self.save(&data)?;
        Ok(true)
    }

    fn update(
        &self,
        reservation_id: &str,
        patch: &ReservationPatch,
    ) -> Result<Option<Reservation>, StoreError> {
        let _guard = self.lock()?;
        let mut data = self.load_strict()?;
        let Some(reservation) = data.iter_mut().find(|r| r.reservation_id == reservation_id) else {
            return Ok(None);
        };
        if !patch.apply(reservation) {
            return Ok(Some(reservation.clone()));
        }
        let updated = reservation.clone();
        self.save(&data)?;
        Ok(Some(updated))
    }

    fn reset(&self) -> Result<usize, StoreError> {
        let _guard = self.lock()?;
        // Reset also clears a file that no longer parses.
        let count = self.load().len();
        self.save(&[])?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[test]
    fn test_json_store_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("reservations.json"));
        contract::exercise(&store);
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reservations.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.get("RES-A").unwrap(), None);
    }

    #[test]
    fn test_writes_refuse_to_overwrite_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reservations.json");
        let full = serde_json::to_string_pretty(&vec![
            contract::sample("RES-OLD1", "2025-06-15T18:00"),
            contract::sample("RES-OLD2", "2025-06-15T19:00"),
        ])
        .unwrap();
        let truncated = &full[..full.len() - 1];
        fs::write(&path, truncated).unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.add(&contract::sample("RES-NEW", "2025-06-16T18:00")),
            Err(StoreError::Serde(_))
        ));
        assert!(store.set_status("RES-OLD1", ReservationStatus::Cancelled).is_err());
        assert!(store
            .update(
                "RES-OLD1",
                &ReservationPatch {
                    party_size: Some(3),
                    ..Default::default()
                }
            )
            .is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), truncated);
    }

    #[test]
    fn test_reset_clears_unparseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reservations.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert_eq!(store.reset().unwrap(), 0);
        store.add(&contract::sample("RES-A", "2025-06-15T18:00")).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(JsonFileStore::new(dir.path().join("reservations.json")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let id = format!("RES-{i}");
                    store.add(&contract::sample(&id, "2025-06-15T18:00")).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.list().unwrap().len(), 8);
    }
}
