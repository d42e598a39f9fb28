use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS prayer_logs (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            date          TEXT NOT NULL,
            prayer        TEXT NOT NULL CHECK(prayer IN ('fajr','dhuhr','asr','maghrib','isha')),
            status        TEXT NOT NULL
                          CHECK(status IN ('on_time','delayed','missed','qadaa')),
            jamaah        TEXT NOT NULL DEFAULT 'absent'
                          CHECK(jamaah IN ('yes','no','absent')),
            friday_sunnah TEXT NOT NULL DEFAULT '[]',
            logged_at     TEXT NOT NULL,
            UNIQUE(date, prayer)
        );

        CREATE TABLE IF NOT EXISTS habits (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL UNIQUE,
            category        TEXT NOT NULL CHECK(category IN ('builtin','custom')),
            basic_desc      TEXT NOT NULL,
            companion_desc  TEXT NOT NULL,
            prophetic_desc  TEXT NOT NULL,
            sort_order      INTEGER DEFAULT 0,
            active          INTEGER DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS habit_logs (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id   INTEGER NOT NULL REFERENCES habits(id),
            date       TEXT NOT NULL,
            level      TEXT NOT NULL CHECK(level IN ('basic','companion','prophetic')),
            reflection TEXT,
            UNIQUE(habit_id, date)
        );

        CREATE TABLE IF NOT EXISTS milestones (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_id     TEXT NOT NULL,
            kind           TEXT NOT NULL,
            threshold_date TEXT NOT NULL,
            recorded_at    TEXT DEFAULT (datetime('now')),
            UNIQUE(subject_id, kind, threshold_date)
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ",
    )?;

    seed_builtins(conn)?;
    Ok(())
}

fn seed_builtins(conn: &Connection) -> Result<()> {
    let builtins = [
        (
            "Siwak",
            "Use the siwak once a day",
            "Use the siwak before two prayers",
            "Use the siwak before every prayer",
            0,
        ),
        (
            "Duha Prayer",
            "Pray 2 rakat of Duha",
            "Pray 4 rakat of Duha",
            "Pray 8 rakat of Duha",
            1,
        ),
        (
            "Quran Reflection",
            "Read one page with reflection",
            "Read five pages with reflection",
            "Read a full juz with reflection",
            2,
        ),
        (
            "Night Prayer",
            "Pray 2 rakat before sleeping",
            "Pray witr after isha",
            "Rise for qiyam in the last third of the night",
            3,
        ),
        (
            "Monday & Thursday Fast",
            "Fast one voluntary day this week",
            "Fast either Monday or Thursday",
            "Fast both Monday and Thursday",
            4,
        ),
    ];

    for (name, basic, companion, prophetic, order) in &builtins {
        conn.execute(
            "INSERT OR IGNORE INTO habits
                (name, category, basic_desc, companion_desc, prophetic_desc, sort_order, active)
             VALUES (?1, 'builtin', ?2, ?3, ?4, ?5, 1)",
            rusqlite::params![name, basic, companion, prophetic, order],
        )?;
    }
    Ok(())
}
