use rusqlite::Connection;

use crate::db::queries;
use crate::errors::StoreError;
use crate::models::ReferenceNumber;

pub const APPOINTMENT_COUNTER: &str = "appointment_id";
pub const SEQUENCE_BASE: i64 = 1_000_000;

/// Hands out the next booking reference. Every call returns a value no other
/// call has seen, including callers on other connections to the same database.
pub fn next_reference(conn: &Connection) -> Result<ReferenceNumber, StoreError> {
    let value = queries::next_sequence(conn, APPOINTMENT_COUNTER, SEQUENCE_BASE)?;
    Ok(ReferenceNumber::from_counter(value))
}
