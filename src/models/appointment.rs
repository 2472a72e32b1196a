use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::slot::SlotKey;

/// Number of visible digits in a reference number.
const REFERENCE_DIGITS: u32 = 7;

/// Public booking reference: the last seven digits of the appointment counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceNumber(String);

impl ReferenceNumber {
    pub fn from_counter(value: i64) -> Self {
        let modulus = 10_i64.pow(REFERENCE_DIGITS);
        Self(format!(
            "{:0width$}",
            value.rem_euclid(modulus),
            width = REFERENCE_DIGITS as usize
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ReferenceNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ReferenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Confirmed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "confirmed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(AppointmentStatus::Confirmed),
            _ => None,
        }
    }
}

/// Everything the committer needs; all values already confirmed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub doctor_name: String,
    pub date: String,
    pub time: String,
    pub patient_name: String,
    pub phone_number: String,
}

impl BookingRequest {
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(self.doctor_name.clone(), &self.date, &self.time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub reference: ReferenceNumber,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
    pub patient_name: String,
    pub phone_number: String,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
}

impl Appointment {
    pub fn confirmed(
        reference: ReferenceNumber,
        request: &BookingRequest,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            reference,
            doctor_name: request.doctor_name.clone(),
            date: request.date.clone(),
            time: request.time.clone(),
            patient_name: request.patient_name.clone(),
            phone_number: request.phone_number.clone(),
            status: AppointmentStatus::Confirmed,
            created_at,
        }
    }
}
