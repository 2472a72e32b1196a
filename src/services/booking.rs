use chrono::Utc;

use crate::errors::{BookingError, StoreError};
use crate::models::{Appointment, BookingRequest, ReferenceNumber, SlotKey};

/// Write side of a booking. Implementations run all three steps against the
/// same store so they can share a transaction.
pub trait Ledger {
    /// Moves the slot from available to booked. False if it was not available.
    fn reserve_slot(&self, key: &SlotKey) -> Result<bool, StoreError>;
    fn next_reference(&self) -> Result<ReferenceNumber, StoreError>;
    fn record_appointment(&self, appointment: &Appointment) -> Result<(), StoreError>;
}

/// Reserves the slot, then issues a reference, then writes the appointment.
///
/// A slot that is gone or already booked is a [`BookingError::Conflict`]; in
/// that case no reference is consumed and nothing is written.
pub fn commit<L: Ledger + ?Sized>(
    ledger: &L,
    request: &BookingRequest,
) -> Result<Appointment, BookingError> {
    let key = request.slot_key();

    if !ledger.reserve_slot(&key)? {
        tracing::info!(
            doctor = %key.doctor_name,
            date_time = %key.date_time,
            "slot no longer available"
        );
        return Err(BookingError::Conflict {
            doctor_name: key.doctor_name,
            date_time: key.date_time,
        });
    }

    let reference = ledger.next_reference()?;
    let appointment = Appointment::confirmed(reference, request, Utc::now().naive_utc());
    ledger.record_appointment(&appointment)?;

    tracing::info!(
        reference = %appointment.reference,
        doctor = %appointment.doctor_name,
        date = %appointment.date,
        time = %appointment.time,
        "appointment booked"
    );

    Ok(appointment)
}

pub fn confirmation_message(appointment: &Appointment) -> String {
    format!(
        "Appointment confirmed!\nID: {}\nDoctor: {}\nDate: {}\nTime: {}",
        appointment.reference, appointment.doctor_name, appointment.date, appointment.time
    )
}
