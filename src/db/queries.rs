use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Appointment, AppointmentStatus, ReferenceNumber, Slot, SlotKey, SlotStatus};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Slots ──

/// Inserts an available slot unless one already exists for the key.
pub fn insert_slot(conn: &Connection, key: &SlotKey) -> rusqlite::Result<bool> {
    let count = conn.execute(
        "INSERT OR IGNORE INTO doctor_schedule (doctor_name, date_time, status) VALUES (?1, ?2, ?3)",
        params![key.doctor_name, key.date_time, SlotStatus::Available.as_str()],
    )?;
    Ok(count > 0)
}

pub fn get_slot(conn: &Connection, key: &SlotKey) -> rusqlite::Result<Option<Slot>> {
    conn.query_row(
        "SELECT doctor_name, date_time, status FROM doctor_schedule
         WHERE doctor_name = ?1 AND date_time = ?2",
        params![key.doctor_name, key.date_time],
        parse_slot_row,
    )
    .optional()
}

/// Slots of one doctor whose label starts with `date_prefix` and whose status matches.
pub fn scan_slots(
    conn: &Connection,
    doctor_name: &str,
    date_prefix: &str,
    status: SlotStatus,
) -> rusqlite::Result<Vec<Slot>> {
    let mut stmt = conn.prepare(
        "SELECT doctor_name, date_time, status FROM doctor_schedule
         WHERE doctor_name = ?1 AND substr(date_time, 1, length(?2)) = ?2 AND status = ?3
         ORDER BY date_time ASC",
    )?;
    let rows = stmt.query_map(
        params![doctor_name, date_prefix, status.as_str()],
        parse_slot_row,
    )?;
    rows.collect()
}

/// Every slot of a doctor's day, whatever its status.
pub fn list_day_slots(
    conn: &Connection,
    doctor_name: &str,
    date: &str,
) -> rusqlite::Result<Vec<Slot>> {
    let prefix = format!("{date}_");
    let mut stmt = conn.prepare(
        "SELECT doctor_name, date_time, status FROM doctor_schedule
         WHERE doctor_name = ?1 AND substr(date_time, 1, length(?2)) = ?2
         ORDER BY date_time ASC",
    )?;
    let rows = stmt.query_map(params![doctor_name, prefix], parse_slot_row)?;
    rows.collect()
}

/// Moves a slot from `from` to `to` in a single statement. Returns false when
/// the slot is missing or not currently in `from`.
pub fn transition_slot(
    conn: &Connection,
    key: &SlotKey,
    from: SlotStatus,
    to: SlotStatus,
) -> rusqlite::Result<bool> {
    let count = conn.execute(
        "UPDATE doctor_schedule SET status = ?1
         WHERE doctor_name = ?2 AND date_time = ?3 AND status = ?4",
        params![to.as_str(), key.doctor_name, key.date_time, from.as_str()],
    )?;
    Ok(count == 1)
}

/// Booked slots with no confirmed appointment for the same doctor, date and time.
pub fn find_orphaned_slots(conn: &Connection) -> rusqlite::Result<Vec<SlotKey>> {
    let mut stmt = conn.prepare(
        "SELECT s.doctor_name, s.date_time
         FROM doctor_schedule s
         LEFT JOIN appointments a
           ON a.doctor_name = s.doctor_name
          AND a.date || '_' || a.time = s.date_time
          AND a.status = 'confirmed'
         WHERE s.status = 'booked' AND a.appointment_id IS NULL
         ORDER BY s.doctor_name, s.date_time",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(SlotKey {
            doctor_name: row.get(0)?,
            date_time: row.get(1)?,
        })
    })?;
    rows.collect()
}

fn parse_slot_row(row: &rusqlite::Row) -> rusqlite::Result<Slot> {
    let status_str: String = row.get(2)?;
    let status = SlotStatus::parse(&status_str).ok_or_else(|| invalid_text(2, &status_str))?;
    Ok(Slot {
        key: SlotKey {
            doctor_name: row.get(0)?,
            date_time: row.get(1)?,
        },
        status,
    })
}

// ── Sequence ──

/// Increments the named counter and returns the new value in one statement.
/// A missing counter starts at `base`, so the first value handed out is `base + 1`.
pub fn next_sequence(conn: &Connection, counter_name: &str, base: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "INSERT INTO id_counters (counter_name, current_value) VALUES (?1, ?2 + 1)
         ON CONFLICT(counter_name) DO UPDATE SET current_value = current_value + 1
         RETURNING current_value",
        params![counter_name, base],
        |row| row.get(0),
    )
}

pub fn current_sequence(conn: &Connection, counter_name: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT current_value FROM id_counters WHERE counter_name = ?1",
        params![counter_name],
        |row| row.get(0),
    )
    .optional()
}

// ── Appointments ──

pub fn insert_appointment(conn: &Connection, appointment: &Appointment) -> rusqlite::Result<()> {
    let created_at = appointment.created_at.format(TIMESTAMP_FORMAT).to_string();
    conn.execute(
        "INSERT INTO appointments (appointment_id, doctor_name, date, time, patient_name, phone_number, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            appointment.reference.as_str(),
            appointment.doctor_name,
            appointment.date,
            appointment.time,
            appointment.patient_name,
            appointment.phone_number,
            appointment.status.as_str(),
            created_at,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, reference: &str) -> rusqlite::Result<Option<Appointment>> {
    conn.query_row(
        "SELECT appointment_id, doctor_name, date, time, patient_name, phone_number, status, created_at
         FROM appointments WHERE appointment_id = ?1",
        params![reference],
        parse_appointment_row,
    )
    .optional()
}

pub fn list_appointments(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(
        "SELECT appointment_id, doctor_name, date, time, patient_name, phone_number, status, created_at
         FROM appointments ORDER BY created_at DESC, appointment_id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], parse_appointment_row)?;
    rows.collect()
}

pub fn count_appointments(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))
}

fn parse_appointment_row(row: &rusqlite::Row) -> rusqlite::Result<Appointment> {
    let status_str: String = row.get(6)?;
    let status =
        AppointmentStatus::parse(&status_str).ok_or_else(|| invalid_text(6, &status_str))?;
    let created_at_str: String = row.get(7)?;
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(Appointment {
        reference: ReferenceNumber::from(row.get::<_, String>(0)?),
        doctor_name: row.get(1)?,
        date: row.get(2)?,
        time: row.get(3)?,
        patient_name: row.get(4)?,
        phone_number: row.get(5)?,
        status,
        created_at,
    })
}

fn invalid_text(idx: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("unexpected value: {value}").into(),
    )
}
