use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::errors::{BookingError, StoreError};
use crate::models::{Appointment, BookingRequest, ReferenceNumber, Slot, SlotKey, SlotStatus};
use crate::services::booking::{self, Ledger};
use crate::services::sequence;

/// Store capabilities the dialog needs: a filtered slot scan for display and
/// an atomic booking commit.
pub trait ClinicStore: Send + Sync {
    fn scan_slots(
        &self,
        doctor_name: &str,
        date_prefix: &str,
        status: SlotStatus,
    ) -> Result<Vec<Slot>, StoreError>;

    fn commit_booking(&self, request: &BookingRequest) -> Result<Appointment, BookingError>;
}

#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.db.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl ClinicStore for SqliteStore {
    fn scan_slots(
        &self,
        doctor_name: &str,
        date_prefix: &str,
        status: SlotStatus,
    ) -> Result<Vec<Slot>, StoreError> {
        let conn = self.conn()?;
        Ok(queries::scan_slots(&conn, doctor_name, date_prefix, status)?)
    }

    /// Slot transition, sequence and appointment share one immediate
    /// transaction: a booked slot without its appointment is never committed.
    fn commit_booking(&self, request: &BookingRequest) -> Result<Appointment, BookingError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;

        let appointment = booking::commit(&SqliteLedger { conn: &*tx }, request)?;

        tx.commit().map_err(StoreError::from)?;
        Ok(appointment)
    }
}

struct SqliteLedger<'c> {
    conn: &'c Connection,
}

impl Ledger for SqliteLedger<'_> {
    fn reserve_slot(&self, key: &SlotKey) -> Result<bool, StoreError> {
        Ok(queries::transition_slot(
            self.conn,
            key,
            SlotStatus::Available,
            SlotStatus::Booked,
        )?)
    }

    fn next_reference(&self) -> Result<ReferenceNumber, StoreError> {
        sequence::next_reference(self.conn)
    }

    fn record_appointment(&self, appointment: &Appointment) -> Result<(), StoreError> {
        Ok(queries::insert_appointment(self.conn, appointment)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::services::sequence::APPOINTMENT_COUNTER;

    fn setup_store() -> (SqliteStore, Arc<Mutex<Connection>>) {
        let conn = db::init_db(":memory:").unwrap();
        let db = Arc::new(Mutex::new(conn));
        (SqliteStore::new(Arc::clone(&db)), db)
    }

    fn request(time: &str) -> BookingRequest {
        BookingRequest {
            doctor_name: "Dr. David Park".to_string(),
            date: "2025-05-06".to_string(),
            time: time.to_string(),
            patient_name: "Alan".to_string(),
            phone_number: "5550199".to_string(),
        }
    }

    fn seed(db: &Arc<Mutex<Connection>>, time: &str) {
        let conn = db.lock().unwrap();
        queries::insert_slot(&conn, &request(time).slot_key()).unwrap();
    }

    #[test]
    fn test_commit_books_slot_and_writes_appointment() {
        let (store, db) = setup_store();
        seed(&db, "09:00");

        let appointment = store.commit_booking(&request("09:00")).unwrap();
        assert_eq!(appointment.reference.as_str(), "1000001");

        let conn = db.lock().unwrap();
        let slot = queries::get_slot(&conn, &request("09:00").slot_key())
            .unwrap()
            .unwrap();
        assert_eq!(slot.status, SlotStatus::Booked);
        let stored = queries::get_appointment(&conn, "1000001").unwrap().unwrap();
        assert_eq!(stored.doctor_name, "Dr. David Park");
        assert_eq!(stored.time, "09:00");
        assert_eq!(stored.patient_name, "Alan");
    }

    #[test]
    fn test_commit_on_booked_slot_conflicts_without_side_effects() {
        let (store, db) = setup_store();
        seed(&db, "09:00");
        store.commit_booking(&request("09:00")).unwrap();

        let err = store.commit_booking(&request("09:00")).unwrap_err();
        assert!(matches!(err, BookingError::Conflict { .. }));

        let conn = db.lock().unwrap();
        assert_eq!(queries::count_appointments(&conn).unwrap(), 1);
        assert_eq!(
            queries::current_sequence(&conn, APPOINTMENT_COUNTER).unwrap(),
            Some(1_000_001)
        );
    }

    #[test]
    fn test_commit_on_missing_slot_conflicts() {
        let (store, db) = setup_store();
        let err = store.commit_booking(&request("15:00")).unwrap_err();
        assert!(matches!(err, BookingError::Conflict { .. }));

        let conn = db.lock().unwrap();
        assert_eq!(queries::count_appointments(&conn).unwrap(), 0);
        assert_eq!(queries::current_sequence(&conn, APPOINTMENT_COUNTER).unwrap(), None);
    }

    #[test]
    fn test_failed_appointment_write_rolls_back_slot() {
        let (store, db) = setup_store();
        seed(&db, "10:00");
        {
            let conn = db.lock().unwrap();
            conn.execute_batch("DROP TABLE appointments").unwrap();
        }

        let err = store.commit_booking(&request("10:00")).unwrap_err();
        assert!(matches!(err, BookingError::Store(_)));

        let conn = db.lock().unwrap();
        let slot = queries::get_slot(&conn, &request("10:00").slot_key())
            .unwrap()
            .unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
        assert_eq!(queries::current_sequence(&conn, APPOINTMENT_COUNTER).unwrap(), None);
    }

    #[test]
    fn test_concurrent_commits_single_winner() {
        let (store, db) = setup_store();
        seed(&db, "11:00");

        let results: Vec<Result<Appointment, BookingError>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    s.spawn(move || store.commit_booking(&request("11:00")))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let wins = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(BookingError::Conflict { .. })))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(conflicts, 7);

        let conn = db.lock().unwrap();
        assert_eq!(queries::count_appointments(&conn).unwrap(), 1);
    }
}
