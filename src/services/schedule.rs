use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::slot::{DATE_FORMAT, TIME_FORMAT};
use crate::models::{Doctor, SlotKey};

pub const DEFAULT_TIMES: [&str; 4] = ["09:00", "10:00", "11:00", "12:00"];
/// Longest range, in days, one generation run may cover.
pub const MAX_SCHEDULE_DAYS: i64 = 366;

/// Weekdays on which a doctor takes appointments.
#[derive(Debug, Clone)]
pub struct WeeklyTemplate {
    pub doctor: Doctor,
    pub weekdays: Vec<Weekday>,
}

pub fn default_templates() -> Vec<WeeklyTemplate> {
    use Weekday::*;
    vec![
        WeeklyTemplate {
            doctor: Doctor::SarahJones,
            weekdays: vec![Mon, Tue, Wed, Thu, Fri],
        },
        WeeklyTemplate {
            doctor: Doctor::SophiaLee,
            weekdays: vec![Mon, Tue, Wed, Thu],
        },
        WeeklyTemplate {
            doctor: Doctor::DavidPark,
            weekdays: vec![Tue, Wed, Thu, Fri],
        },
    ]
}

/// Times must already be zero-padded `HH:MM`; they become part of the slot key.
pub fn validate_times(times: &[String]) -> anyhow::Result<()> {
    anyhow::ensure!(!times.is_empty(), "at least one time is required");
    for t in times {
        let parsed = NaiveTime::parse_from_str(t, TIME_FORMAT)
            .map_err(|_| anyhow::anyhow!("invalid time: {t}"))?;
        anyhow::ensure!(
            parsed.format(TIME_FORMAT).to_string() == *t,
            "time must be zero-padded HH:MM: {t}"
        );
    }
    Ok(())
}

pub fn validate_range(start: NaiveDate, end: NaiveDate) -> anyhow::Result<()> {
    anyhow::ensure!(start <= end, "schedule start {start} is after end {end}");
    let days = (end - start).num_days() + 1;
    anyhow::ensure!(
        days <= MAX_SCHEDULE_DAYS,
        "schedule range covers {days} days, at most {MAX_SCHEDULE_DAYS} allowed"
    );
    Ok(())
}

/// Every (doctor, working day, time) slot between `start` and `end`, inclusive.
pub fn plan_slots(
    templates: &[WeeklyTemplate],
    times: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<SlotKey> {
    let mut keys = vec![];
    for template in templates {
        for day in start.iter_days().take_while(|d| *d <= end) {
            if !template.weekdays.contains(&day.weekday()) {
                continue;
            }
            let date = day.format(DATE_FORMAT).to_string();
            for time in times {
                keys.push(SlotKey::new(template.doctor.name(), &date, time));
            }
        }
    }
    keys
}

/// Inserts the planned slots in one transaction. Existing slots, booked or
/// not, are left untouched. Returns how many were created.
pub fn generate_schedule(
    conn: &mut Connection,
    templates: &[WeeklyTemplate],
    times: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<usize> {
    validate_range(start, end)?;
    validate_times(times)?;

    let keys = plan_slots(templates, times, start, end);
    let tx = conn.transaction()?;
    let mut created = 0;
    for key in &keys {
        if queries::insert_slot(&tx, key)? {
            created += 1;
        }
    }
    tx.commit()?;

    tracing::info!(%start, %end, planned = keys.len(), created, "schedule generated");
    Ok(created)
}

pub fn default_times() -> Vec<String> {
    DEFAULT_TIMES.iter().map(|t| t.to_string()).collect()
}
