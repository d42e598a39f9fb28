use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Commitment tier for a Sunnah practice. Ordering matters: a log at a
/// higher tier than any previous log counts as a tier upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitLevel {
    Basic,
    Companion,
    Prophetic,
}

impl HabitLevel {
    pub fn all() -> [HabitLevel; 3] {
        [HabitLevel::Basic, HabitLevel::Companion, HabitLevel::Prophetic]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HabitLevel::Basic => "basic",
            HabitLevel::Companion => "companion",
            HabitLevel::Prophetic => "prophetic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HabitLevel::Basic => "Basic",
            HabitLevel::Companion => "Companion",
            HabitLevel::Prophetic => "Prophetic",
        }
    }
}

impl FromStr for HabitLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(HabitLevel::Basic),
            "companion" => Ok(HabitLevel::Companion),
            "prophetic" => Ok(HabitLevel::Prophetic),
            _ => Err(anyhow::anyhow!("Unknown habit level: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitCategory {
    Builtin,
    Custom,
}

impl HabitCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitCategory::Builtin => "builtin",
            HabitCategory::Custom => "custom",
        }
    }
}

/// A trackable Sunnah practice with its three fixed tier descriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub name: String,
    pub category: HabitCategory,
    pub basic_desc: String,
    pub companion_desc: String,
    pub prophetic_desc: String,
    pub sort_order: i32,
    pub active: bool,
}

impl Habit {
    pub fn tier_description(&self, level: HabitLevel) -> &str {
        match level {
            HabitLevel::Basic => &self.basic_desc,
            HabitLevel::Companion => &self.companion_desc,
            HabitLevel::Prophetic => &self.prophetic_desc,
        }
    }
}

/// One logged habit day. One row per (habit_id, date); resubmitting the
/// same day overwrites the tier (last write wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitLog {
    pub id: Option<i64>,
    pub habit_id: i64,
    pub date: NaiveDate,
    pub level: HabitLevel,
    pub reflection: Option<String>,
}
