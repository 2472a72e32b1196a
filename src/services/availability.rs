use chrono::{NaiveDate, NaiveTime};

use crate::errors::StoreError;
use crate::models::slot::{DATE_FORMAT, TIME_FORMAT};
use crate::models::{Doctor, SlotStatus};
use crate::services::store::ClinicStore;

/// Open times (`HH:MM`) for a doctor on `date`, earliest first.
///
/// An unparseable date simply has no openings.
pub fn available_times(
    store: &dyn ClinicStore,
    doctor: Doctor,
    date: &str,
) -> Result<Vec<String>, StoreError> {
    if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
        tracing::debug!(date, "not a calendar date, no availability");
        return Ok(vec![]);
    }

    let prefix = format!("{date}_");
    let mut times: Vec<String> = store
        .scan_slots(doctor.name(), &prefix, SlotStatus::Available)?
        .into_iter()
        .filter(|slot| slot.status == SlotStatus::Available)
        .filter_map(|slot| slot.key.time_label().map(str::to_string))
        .collect();

    times.sort_by_cached_key(|t| (NaiveTime::parse_from_str(t, TIME_FORMAT).ok(), t.clone()));
    times.dedup();
    Ok(times)
}
