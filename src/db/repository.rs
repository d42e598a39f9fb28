use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{
    Habit, HabitCategory, HabitLevel, HabitLog, Jamaah, Milestone, PrayerLog, PrayerStatus,
    PrayerType,
};

/// Errors of the log-store contract. `ValidationFailed` and `Conflict`
/// are caller bugs surfaced immediately, never retried; `Unavailable`
/// wraps the underlying store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("a log already exists for {prayer} on {date}")]
    Conflict { date: NaiveDate, prayer: PrayerType },
    #[error("store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(s: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| StoreError::ValidationFailed(format!("bad date '{}': {}", s, e)))
}

// ─── Prayer logs ─────────────────────────────────────────────────────────────

pub struct PrayerLogRepo;

impl PrayerLogRepo {
    /// Validate and persist one prayer log. At most one row may exist per
    /// (date, prayer); a second submission is a `Conflict`.
    pub fn submit(conn: &Connection, log: &PrayerLog) -> StoreResult<PrayerLog> {
        Self::validate(log)?;

        if Self::get(conn, log.date, log.prayer)?.is_some() {
            return Err(StoreError::Conflict {
                date: log.date,
                prayer: log.prayer,
            });
        }

        let friday_json = serde_json::to_string(&log.friday_sunnah)
            .map_err(|e| StoreError::ValidationFailed(e.to_string()))?;
        conn.execute(
            "INSERT INTO prayer_logs (date, prayer, status, jamaah, friday_sunnah, logged_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                date_str(log.date),
                log.prayer.as_str(),
                log.status.as_str(),
                log.jamaah.as_str(),
                friday_json,
                log.logged_at.to_rfc3339(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Ok(PrayerLog {
            id: Some(id),
            ..log.clone()
        })
    }

    fn validate(log: &PrayerLog) -> StoreResult<()> {
        if log.status != PrayerStatus::OnTime && log.jamaah != Jamaah::Absent {
            return Err(StoreError::ValidationFailed(
                "jamaah is only meaningful for on-time prayers".to_string(),
            ));
        }
        if !log.friday_sunnah.is_empty() {
            let valid_context = log.prayer == PrayerType::Dhuhr
                && log.date.weekday() == Weekday::Fri
                && log.status == PrayerStatus::OnTime
                && log.jamaah == Jamaah::Yes;
            if !valid_context {
                return Err(StoreError::ValidationFailed(
                    "friday sunnah items require an on-time Dhuhr in congregation on a Friday"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn get(
        conn: &Connection,
        date: NaiveDate,
        prayer: PrayerType,
    ) -> StoreResult<Option<PrayerLog>> {
        let row = conn
            .query_row(
                "SELECT id, date, prayer, status, jamaah, friday_sunnah, logged_at
                 FROM prayer_logs WHERE date = ?1 AND prayer = ?2",
                params![date_str(date), prayer.as_str()],
                row_tuple,
            )
            .optional()?;
        row.map(from_row).transpose()
    }

    pub fn list_range(
        conn: &Connection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<PrayerLog>> {
        let mut stmt = conn.prepare(
            "SELECT id, date, prayer, status, jamaah, friday_sunnah, logged_at
             FROM prayer_logs WHERE date >= ?1 AND date <= ?2
             ORDER BY date, CASE prayer
               WHEN 'fajr' THEN 1 WHEN 'dhuhr' THEN 2 WHEN 'asr' THEN 3
               WHEN 'maghrib' THEN 4 WHEN 'isha' THEN 5 END",
        )?;
        let rows = stmt.query_map(params![date_str(start), date_str(end)], row_tuple)?;

        let mut result = Vec::new();
        for r in rows {
            result.push(from_row(r?)?);
        }
        Ok(result)
    }

    /// Logged-prayer count per day over a range. Only days with activity
    /// appear; the heatmap fills the gaps.
    pub fn daily_counts(
        conn: &Connection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<BTreeMap<NaiveDate, u8>> {
        let mut stmt = conn.prepare(
            "SELECT date, COUNT(*) FROM prayer_logs
             WHERE date >= ?1 AND date <= ?2
             GROUP BY date ORDER BY date",
        )?;
        let rows = stmt.query_map(params![date_str(start), date_str(end)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = BTreeMap::new();
        for r in rows {
            let (date, count) = r?;
            counts.insert(parse_date(&date)?, count.min(5) as u8);
        }
        Ok(counts)
    }

    /// Per-day completion percentage over all recorded history: the count
    /// of on-time prayers out of five. This is what the streak engine
    /// consumes; only days with any activity appear.
    pub fn completion_map(conn: &Connection) -> StoreResult<BTreeMap<NaiveDate, f64>> {
        let mut stmt = conn.prepare(
            "SELECT date,
                    SUM(CASE WHEN status = 'on_time' THEN 1 ELSE 0 END)
             FROM prayer_logs GROUP BY date ORDER BY date",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut map = BTreeMap::new();
        for r in rows {
            let (date, on_time) = r?;
            map.insert(parse_date(&date)?, on_time as f64 / 5.0 * 100.0);
        }
        Ok(map)
    }
}

type RawRow = (i64, String, String, String, String, String, String);

fn row_tuple(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn from_row(raw: RawRow) -> StoreResult<PrayerLog> {
    let (id, date, prayer, status, jamaah, friday_json, logged_at) = raw;
    Ok(PrayerLog {
        id: Some(id),
        date: parse_date(&date)?,
        prayer: PrayerType::from_str(&prayer)
            .map_err(|e| StoreError::ValidationFailed(e.to_string()))?,
        status: PrayerStatus::from_str(&status)
            .map_err(|e| StoreError::ValidationFailed(e.to_string()))?,
        jamaah: Jamaah::from_str(&jamaah)
            .map_err(|e| StoreError::ValidationFailed(e.to_string()))?,
        friday_sunnah: serde_json::from_str(&friday_json)
            .map_err(|e| StoreError::ValidationFailed(e.to_string()))?,
        logged_at: DateTime::parse_from_rfc3339(&logged_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| StoreError::ValidationFailed(e.to_string()))?,
    })
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub struct HabitRepo;

impl HabitRepo {
    pub fn list_active(conn: &Connection) -> StoreResult<Vec<Habit>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, category, basic_desc, companion_desc, prophetic_desc, sort_order
             FROM habits WHERE active = 1 ORDER BY sort_order, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, i32>(6)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, name, category, basic, companion, prophetic, sort_order) = r?;
            let category = match category.as_str() {
                "custom" => HabitCategory::Custom,
                _ => HabitCategory::Builtin,
            };
            result.push(Habit {
                id,
                name,
                category,
                basic_desc: basic,
                companion_desc: companion,
                prophetic_desc: prophetic,
                sort_order,
                active: true,
            });
        }
        Ok(result)
    }

    pub fn find_by_name(conn: &Connection, name: &str) -> StoreResult<Option<Habit>> {
        let habits = Self::list_active(conn)?;
        Ok(habits
            .into_iter()
            .find(|h| h.name.to_lowercase() == name.to_lowercase()))
    }

    pub fn add_custom(
        conn: &Connection,
        name: &str,
        basic: &str,
        companion: &str,
        prophetic: &str,
    ) -> StoreResult<()> {
        let max_order: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(sort_order), 100) FROM habits WHERE category = 'custom'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(100);

        conn.execute(
            "INSERT INTO habits
                (name, category, basic_desc, companion_desc, prophetic_desc, sort_order, active)
             VALUES (?1, 'custom', ?2, ?3, ?4, ?5, 1)",
            params![name, basic, companion, prophetic, max_order + 1],
        )?;
        Ok(())
    }
}

// ─── Habit logs ──────────────────────────────────────────────────────────────

pub struct HabitLogRepo;

impl HabitLogRepo {
    /// Upsert one habit day. Resubmitting the same (habit, date)
    /// overwrites the tier and reflection: last write wins.
    pub fn submit(conn: &Connection, log: &HabitLog) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO habit_logs (habit_id, date, level, reflection)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(habit_id, date) DO UPDATE SET level = ?3, reflection = ?4",
            params![
                log.habit_id,
                date_str(log.date),
                log.level.as_str(),
                log.reflection,
            ],
        )?;
        Ok(())
    }

    pub fn list_range(
        conn: &Connection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<HabitLog>> {
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, date, level, reflection FROM habit_logs
             WHERE date >= ?1 AND date <= ?2 ORDER BY date, habit_id",
        )?;
        let rows = stmt.query_map(params![date_str(start), date_str(end)], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, habit_id, date, level, reflection) = r?;
            result.push(HabitLog {
                id: Some(id),
                habit_id,
                date: parse_date(&date)?,
                level: HabitLevel::from_str(&level)
                    .map_err(|e| StoreError::ValidationFailed(e.to_string()))?,
                reflection,
            });
        }
        Ok(result)
    }

    pub fn list_all(conn: &Connection) -> StoreResult<Vec<HabitLog>> {
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, date, level, reflection FROM habit_logs
             ORDER BY date, habit_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, habit_id, date, level, reflection) = r?;
            result.push(HabitLog {
                id: Some(id),
                habit_id,
                date: parse_date(&date)?,
                level: HabitLevel::from_str(&level)
                    .map_err(|e| StoreError::ValidationFailed(e.to_string()))?,
                reflection,
            });
        }
        Ok(result)
    }
}

// ─── Milestones ──────────────────────────────────────────────────────────────

pub struct MilestoneRepo;

impl MilestoneRepo {
    /// Record a crossing once. Returns true only when the milestone was
    /// newly inserted, so re-evaluating the same history is idempotent.
    pub fn record(conn: &Connection, milestone: &Milestone) -> StoreResult<bool> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO milestones (subject_id, kind, threshold_date)
             VALUES (?1, ?2, ?3)",
            params![
                milestone.subject_id,
                milestone.kind.as_str(),
                date_str(milestone.threshold_date),
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Record a batch; returns only the milestones that were new.
    pub fn record_new(conn: &Connection, milestones: &[Milestone]) -> StoreResult<Vec<Milestone>> {
        let mut fresh = Vec::new();
        for m in milestones {
            if Self::record(conn, m)? {
                fresh.push(m.clone());
            }
        }
        Ok(fresh)
    }

    pub fn count(conn: &Connection) -> StoreResult<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM milestones", [], |row| row.get(0))?)
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> StoreResult<Option<String>> {
        Ok(conn
            .query_row(
                "SELECT value FROM app_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::MilestoneKind;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn log(date: NaiveDate, prayer: PrayerType, status: PrayerStatus, jamaah: Jamaah) -> PrayerLog {
        PrayerLog {
            id: None,
            date,
            prayer,
            status,
            jamaah,
            friday_sunnah: vec![],
            logged_at: Utc::now(),
        }
    }

    #[test]
    fn submit_and_read_back() {
        let conn = open();
        let saved = PrayerLogRepo::submit(
            &conn,
            &log(d(2), PrayerType::Fajr, PrayerStatus::OnTime, Jamaah::Yes),
        )
        .unwrap();
        assert!(saved.id.is_some());

        let listed = PrayerLogRepo::list_range(&conn, d(1), d(3)).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].prayer, PrayerType::Fajr);
        assert_eq!(listed[0].jamaah, Jamaah::Yes);
    }

    #[test]
    fn second_log_for_same_slot_conflicts() {
        let conn = open();
        let first = log(d(2), PrayerType::Asr, PrayerStatus::OnTime, Jamaah::No);
        PrayerLogRepo::submit(&conn, &first).unwrap();

        let second = log(d(2), PrayerType::Asr, PrayerStatus::Delayed, Jamaah::Absent);
        let err = PrayerLogRepo::submit(&conn, &second).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[test]
    fn jamaah_rejected_off_time() {
        let conn = open();
        let bad = log(d(2), PrayerType::Isha, PrayerStatus::Missed, Jamaah::Yes);
        let err = PrayerLogRepo::submit(&conn, &bad).unwrap_err();
        assert!(matches!(err, StoreError::ValidationFailed(_)));
    }

    #[test]
    fn friday_sunnah_requires_jumuah_context() {
        let conn = open();
        // 2025-06-06 is a Friday; Asr is the wrong prayer
        let friday = NaiveDate::from_ymd_opt(2025, 6, 6).unwrap();
        let mut bad = log(friday, PrayerType::Asr, PrayerStatus::OnTime, Jamaah::Yes);
        bad.friday_sunnah = vec!["ghusl".to_string()];
        let err = PrayerLogRepo::submit(&conn, &bad).unwrap_err();
        assert!(matches!(err, StoreError::ValidationFailed(_)));

        let mut good = log(friday, PrayerType::Dhuhr, PrayerStatus::OnTime, Jamaah::Yes);
        good.friday_sunnah = vec!["ghusl".to_string(), "surah_kahf".to_string()];
        let saved = PrayerLogRepo::submit(&conn, &good).unwrap();
        let read = PrayerLogRepo::get(&conn, friday, PrayerType::Dhuhr)
            .unwrap()
            .unwrap();
        assert_eq!(read.friday_sunnah, saved.friday_sunnah);
    }

    #[test]
    fn completion_map_counts_on_time_out_of_five() {
        let conn = open();
        for prayer in PrayerType::all() {
            PrayerLogRepo::submit(&conn, &log(d(2), prayer, PrayerStatus::OnTime, Jamaah::No))
                .unwrap();
        }
        PrayerLogRepo::submit(
            &conn,
            &log(d(3), PrayerType::Fajr, PrayerStatus::OnTime, Jamaah::No),
        )
        .unwrap();
        PrayerLogRepo::submit(
            &conn,
            &log(d(3), PrayerType::Dhuhr, PrayerStatus::Delayed, Jamaah::Absent),
        )
        .unwrap();

        let map = PrayerLogRepo::completion_map(&conn).unwrap();
        assert_eq!(map.get(&d(2)), Some(&100.0));
        assert_eq!(map.get(&d(3)), Some(&20.0));
    }

    #[test]
    fn habit_resubmission_overwrites_tier() {
        let conn = open();
        let habit = HabitRepo::find_by_name(&conn, "Siwak").unwrap().unwrap();

        let mut entry = HabitLog {
            id: None,
            habit_id: habit.id,
            date: d(5),
            level: HabitLevel::Basic,
            reflection: None,
        };
        HabitLogRepo::submit(&conn, &entry).unwrap();
        entry.level = HabitLevel::Prophetic;
        entry.reflection = Some("before every prayer today".to_string());
        HabitLogRepo::submit(&conn, &entry).unwrap();

        let logs = HabitLogRepo::list_range(&conn, d(5), d(5)).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level, HabitLevel::Prophetic);
        assert_eq!(logs[0].reflection.as_deref(), Some("before every prayer today"));
    }

    #[test]
    fn milestone_recording_is_idempotent() {
        let conn = open();
        let milestone = Milestone {
            subject_id: "habit:1".to_string(),
            kind: MilestoneKind::StreakSeven,
            threshold_date: d(7),
        };
        assert!(MilestoneRepo::record(&conn, &milestone).unwrap());
        assert!(!MilestoneRepo::record(&conn, &milestone).unwrap());
        assert_eq!(MilestoneRepo::count(&conn).unwrap(), 1);
    }

    #[test]
    fn migrations_are_rerunnable_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("barakah.db");
        {
            let conn = Connection::open(&path).unwrap();
            run_migrations(&conn).unwrap();
            PrayerLogRepo::submit(
                &conn,
                &log(d(2), PrayerType::Fajr, PrayerStatus::OnTime, Jamaah::No),
            )
            .unwrap();
        }
        let conn = Connection::open(&path).unwrap();
        run_migrations(&conn).unwrap();
        // seeded habits are not duplicated and data survives
        let habits = HabitRepo::list_active(&conn).unwrap();
        assert_eq!(habits.iter().filter(|h| h.name == "Siwak").count(), 1);
        assert_eq!(PrayerLogRepo::list_range(&conn, d(1), d(3)).unwrap().len(), 1);
    }

    #[test]
    fn meta_roundtrip() {
        let conn = open();
        assert_eq!(MetaRepo::get(&conn, "k").unwrap(), None);
        MetaRepo::set(&conn, "k", "v1").unwrap();
        MetaRepo::set(&conn, "k", "v2").unwrap();
        assert_eq!(MetaRepo::get(&conn, "k").unwrap(), Some("v2".to_string()));
    }
}
