use chrono::{Duration, NaiveDateTime};

use crate::models::slot::date_time_label;
use crate::models::Appointment;

pub const APPOINTMENT_MINUTES: i64 = 60;

/// iCalendar file for one appointment. `None` if its date/time cannot be parsed.
pub fn generate_ics(appointment: &Appointment) -> Option<String> {
    let start = NaiveDateTime::parse_from_str(
        &date_time_label(&appointment.date, &appointment.time),
        "%Y-%m-%d_%H:%M",
    )
    .ok()?;
    let dtstart = start.format("%Y%m%dT%H%M%S").to_string();
    let dtend = (start + Duration::minutes(APPOINTMENT_MINUTES))
        .format("%Y%m%dT%H%M%S")
        .to_string();
    let dtstamp = appointment.created_at.format("%Y%m%dT%H%M%S").to_string();
    let uid = format!("{}@clinicbook", appointment.reference);
    let summary = format!("Appointment with {}", appointment.doctor_name);

    Some(format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Clinicbook//Appointments//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:Reference {reference}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n",
        reference = appointment.reference,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, ReferenceNumber};

    fn appointment(time: &str) -> Appointment {
        Appointment {
            reference: ReferenceNumber::from_counter(1_000_123),
            doctor_name: "Dr. Sophia Lee".to_string(),
            date: "2025-05-07".to_string(),
            time: time.to_string(),
            patient_name: "Grace".to_string(),
            phone_number: "5550100".to_string(),
            status: AppointmentStatus::Confirmed,
            created_at: NaiveDateTime::parse_from_str("2025-05-01 08:30:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
        }
    }

    #[test]
    fn test_generate_ics() {
        let ics = generate_ics(&appointment("11:00")).unwrap();
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains("UID:1000123@clinicbook"));
        assert!(ics.contains("DTSTART:20250507T110000"));
        assert!(ics.contains("DTEND:20250507T120000"));
        assert!(ics.contains("DTSTAMP:20250501T083000"));
        assert!(ics.contains("SUMMARY:Appointment with Dr. Sophia Lee"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_unparseable_time() {
        assert!(generate_ics(&appointment("noon")).is_none());
    }
}
