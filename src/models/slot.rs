use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Booked,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "available",
            SlotStatus::Booked => "booked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(SlotStatus::Available),
            "booked" => Some(SlotStatus::Booked),
            _ => None,
        }
    }
}

/// Identity of one doctor's time slot: the doctor plus a `YYYY-MM-DD_HH:MM` label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotKey {
    pub doctor_name: String,
    pub date_time: String,
}

impl SlotKey {
    pub fn new(doctor_name: impl Into<String>, date: &str, time: &str) -> Self {
        Self {
            doctor_name: doctor_name.into(),
            date_time: date_time_label(date, time),
        }
    }

    pub fn time_label(&self) -> Option<&str> {
        self.date_time.split_once('_').map(|(_, t)| t)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    #[serde(flatten)]
    pub key: SlotKey,
    pub status: SlotStatus,
}

pub fn date_time_label(date: &str, time: &str) -> String {
    format!("{date}_{time}")
}
