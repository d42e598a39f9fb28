use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerType {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerType {
    pub fn all() -> [PrayerType; 5] {
        [
            PrayerType::Fajr,
            PrayerType::Dhuhr,
            PrayerType::Asr,
            PrayerType::Maghrib,
            PrayerType::Isha,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerType::Fajr => "fajr",
            PrayerType::Dhuhr => "dhuhr",
            PrayerType::Asr => "asr",
            PrayerType::Maghrib => "maghrib",
            PrayerType::Isha => "isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerType::Fajr => "Fajr",
            PrayerType::Dhuhr => "Dhuhr",
            PrayerType::Asr => "Asr",
            PrayerType::Maghrib => "Maghrib",
            PrayerType::Isha => "Isha",
        }
    }
}

impl std::fmt::Display for PrayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fajr" => Ok(PrayerType::Fajr),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerType::Dhuhr),
            "asr" => Ok(PrayerType::Asr),
            "maghrib" => Ok(PrayerType::Maghrib),
            "isha" => Ok(PrayerType::Isha),
            _ => Err(anyhow::anyhow!("Unknown prayer type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrayerStatus {
    OnTime,
    Delayed,
    Missed,
    Qadaa,
}

impl PrayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerStatus::OnTime => "on_time",
            PrayerStatus::Delayed => "delayed",
            PrayerStatus::Missed => "missed",
            PrayerStatus::Qadaa => "qadaa",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerStatus::OnTime => "On time",
            PrayerStatus::Delayed => "Delayed",
            PrayerStatus::Missed => "Missed",
            PrayerStatus::Qadaa => "Qadaa",
        }
    }
}

impl FromStr for PrayerStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on_time" | "ontime" | "on-time" => Ok(PrayerStatus::OnTime),
            "delayed" | "late" => Ok(PrayerStatus::Delayed),
            "missed" => Ok(PrayerStatus::Missed),
            "qadaa" | "qada" => Ok(PrayerStatus::Qadaa),
            _ => Err(anyhow::anyhow!("Unknown prayer status: {}", s)),
        }
    }
}

/// Congregation flag. Only meaningful for on-time prayers; every other
/// status stores `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Jamaah {
    Yes,
    No,
    #[default]
    Absent,
}

impl Jamaah {
    pub fn as_str(&self) -> &'static str {
        match self {
            Jamaah::Yes => "yes",
            Jamaah::No => "no",
            Jamaah::Absent => "absent",
        }
    }
}

impl FromStr for Jamaah {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Jamaah::Yes),
            "no" => Ok(Jamaah::No),
            "absent" => Ok(Jamaah::Absent),
            _ => Err(anyhow::anyhow!("Unknown jamaah flag: {}", s)),
        }
    }
}

/// One logged prayer. At most one row exists per (date, prayer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerLog {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub prayer: PrayerType,
    pub status: PrayerStatus,
    pub jamaah: Jamaah,
    /// Friday-sunnah checklist item ids. Non-empty only for an on-time
    /// Dhuhr in congregation on a Friday (Jumuah).
    pub friday_sunnah: Vec<String>,
    pub logged_at: DateTime<Utc>,
}

impl PrayerLog {
    pub fn counts_on_time(&self) -> bool {
        self.status == PrayerStatus::OnTime
    }

    pub fn in_congregation(&self) -> bool {
        self.jamaah == Jamaah::Yes
    }
}
