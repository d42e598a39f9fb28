use chrono::{Datelike, Duration, NaiveDate};

/// Islamic month names in English (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

/// JDN of 1 Muharram 1 AH in the civil tabular calendar.
const HIJRI_EPOCH_JDN: i64 = 1_948_440;

fn hijri_month_name(month: u32) -> &'static str {
    if (1..=12).contains(&month) {
        HIJRI_MONTH_NAMES[(month - 1) as usize]
    } else {
        "Unknown"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HijriDate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl HijriDate {
    pub fn month_name(&self) -> &'static str {
        hijri_month_name(self.month)
    }

    pub fn formatted(&self) -> String {
        format!("{} {} {}", self.day, self.month_name(), self.year)
    }
}

/// Julian Day Number of a Gregorian (proleptic civil) date.
fn julian_day_number(date: NaiveDate) -> i64 {
    let (year, month, day) = (date.year() as i64, date.month() as i64, date.day() as i64);
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    day + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045
}

/// Convert a Gregorian date to the tabular (arithmetic) Hijri calendar.
///
/// Total and deterministic for any valid Gregorian date. The tabular
/// method does not consult astronomical data, so results can differ by a
/// day or two from locally observed lunar calendars; that is an accepted
/// approximation, not a defect.
pub fn gregorian_to_hijri(date: NaiveDate) -> HijriDate {
    let jdn = julian_day_number(date);

    let mut l = jdn - HIJRI_EPOCH_JDN + 10632;
    let n = (l - 1) / 10631;
    l = l - 10631 * n + 354;
    let j =
        ((10985 - l) / 5316) * ((50 * l) / 17719) + (l / 5670) * ((43 * l) / 15238);
    l = l - ((30 - j) / 15) * ((17719 * j) / 50) - (j / 16) * ((15238 * j) / 43) + 29;
    let month = (24 * l) / 709;
    let day = l - (709 * month) / 24;
    let year = 30 * n + j - 30;

    HijriDate {
        day: day as u32,
        month: month as u32,
        year: year as i32,
    }
}

/// Hijri date for a Gregorian day with a local moon-sighting offset
/// applied (e.g. -1 if your region sights one day behind Saudi Arabia).
pub fn to_hijri_with_offset(date: NaiveDate, offset_days: i32) -> HijriDate {
    let adjusted = date + Duration::days(offset_days as i64);
    gregorian_to_hijri(adjusted)
}
