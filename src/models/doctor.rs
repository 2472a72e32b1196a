use serde::{Deserialize, Serialize};

/// Doctors that can be booked. Adding one also needs slots in the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Doctor {
    #[serde(rename = "Dr. Sarah Jones")]
    SarahJones,
    #[serde(rename = "Dr. Sophia Lee")]
    SophiaLee,
    #[serde(rename = "Dr. David Park")]
    DavidPark,
}

impl Doctor {
    pub const ALL: [Doctor; 3] = [Doctor::SarahJones, Doctor::SophiaLee, Doctor::DavidPark];

    pub fn name(&self) -> &'static str {
        match self {
            Doctor::SarahJones => "Dr. Sarah Jones",
            Doctor::SophiaLee => "Dr. Sophia Lee",
            Doctor::DavidPark => "Dr. David Park",
        }
    }

    /// Case-insensitive lookup against the canonical names.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
    }

    pub fn menu() -> String {
        Self::ALL
            .iter()
            .map(|d| format!("- {}", d.name()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for Doctor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
