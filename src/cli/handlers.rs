use anyhow::{anyhow, Result};
use chrono::{Duration, Local, NaiveDate, Utc};
use rusqlite::Connection;
use std::str::FromStr;

use crate::cli::args::HabitCommands;
use crate::config::AppConfig;
use crate::db::repository::{HabitLogRepo, HabitRepo, MilestoneRepo, PrayerLogRepo};
use crate::engine::log_flow::{FlowEvent, FlowState, LogFlow};
use crate::engine::{heatmap, performance, reward, stats, streak, sunnah};
use crate::models::{
    HabitLevel, HabitLog, Milestone, MilestoneKind, PrayerStatus, PrayerType,
};
use crate::sensors::{ConfigLocation, FixedHeading, HeadingSource, LocationProvider, SensorError};
use crate::utils::format::{format_percent, level_glyph, progress_bar};
use crate::utils::{hijri, qibla};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn parse_cli_date(date: &Option<String>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| anyhow!("Bad date '{}': {}", s, e)),
        None => Ok(Local::now().date_naive()),
    }
}

// ─── Log a prayer ────────────────────────────────────────────────────────────

pub fn handle_log(
    conn: &Connection,
    config: &AppConfig,
    prayer_str: &str,
    status_str: &str,
    jamaah: bool,
    friday: &[String],
    date: &Option<String>,
) -> Result<()> {
    let prayer = PrayerType::from_str(prayer_str)
        .map_err(|_| anyhow!("Unknown prayer '{}'. Use: fajr, dhuhr, asr, maghrib, isha", prayer_str))?;
    let status = PrayerStatus::from_str(status_str)
        .map_err(|_| anyhow!("Unknown status '{}'. Use: on_time, delayed, missed, qadaa", status_str))?;
    let date = parse_cli_date(date)?;

    // Drive the explicit submission flow so the same validation applies
    // here as in any other front end.
    let mut flow = LogFlow::new(date, prayer);
    flow.on_event(FlowEvent::ChooseStatus(status))?;
    if flow.state() == FlowState::SelectingJamaah {
        flow.on_event(FlowEvent::ChooseJamaah(jamaah))?;
    } else if jamaah {
        return Err(anyhow!("--jamaah only applies to on-time prayers"));
    }

    let points = reward::points(status, flow.jamaah(), &config.scoring);
    let reveal = reward::reveal_sequence(status, flow.jamaah(), &config.scoring);
    log::debug!("reward reveal sequence: {:?}", reveal);

    let state = flow.on_event(FlowEvent::AcknowledgeReward)?;
    if state == FlowState::SelectingFridaySunnah {
        for item in friday {
            flow.on_event(FlowEvent::ToggleFridayItem(item.clone()))?;
        }
        flow.on_event(FlowEvent::ConfirmChecklist)?;
    } else if !friday.is_empty() {
        return Err(anyhow!(
            "--friday only applies to an on-time Dhuhr in congregation on a Friday"
        ));
    }

    let draft = flow.into_log(Utc::now())?;
    let saved = PrayerLogRepo::submit(conn, &draft)?;

    let multiplier = reveal.last().copied().unwrap_or(1);
    if multiplier > 1 {
        println_colored!(
            GOLD,
            "  ✓ {} — {} ×{} = {} barakah points",
            saved.prayer.display_name(),
            saved.status.display_name(),
            multiplier,
            points
        );
    } else {
        println_colored!(
            GREEN,
            "  ✓ {} — {} (+{} barakah points)",
            saved.prayer.display_name(),
            saved.status.display_name(),
            points
        );
    }

    let mut rng = reward::OsRandom;
    println_colored!(DIM, "  {}", reward::congratulation(status, saved.jamaah, &mut rng));

    if !saved.friday_sunnah.is_empty() {
        println_colored!(DIM, "  Jumuah checklist: {}", saved.friday_sunnah.join(", "));
    }

    // Streak milestones are a pure lookup; the store keeps them idempotent.
    // The crossing is dated by the run itself, so backfilled logs do not
    // stamp it with their own date.
    let completion = PrayerLogRepo::completion_map(conn)?;
    let today = Local::now().date_naive();
    let info = streak::compute(&completion, today);
    if let Some(threshold) = streak::milestone_reached(info.current, &config.streak.milestones) {
        if let (Some(kind), Some(crossed)) = (
            MilestoneKind::from_streak_threshold(threshold),
            streak::threshold_date(&completion, today, info.current, threshold),
        ) {
            let milestone = Milestone {
                subject_id: "prayers".to_string(),
                kind,
                threshold_date: crossed,
            };
            if MilestoneRepo::record(conn, &milestone)? {
                println_colored!(GOLD, "  ★ {}-day streak!", threshold);
            }
        }
    }
    Ok(())
}

// ─── Today ───────────────────────────────────────────────────────────────────

pub fn handle_today(conn: &Connection, config: &AppConfig) -> Result<()> {
    let today = Local::now().date_naive();
    let logs = PrayerLogRepo::list_range(conn, today, today)?;
    let perf = performance::score_day(today, &logs, &config.scoring);

    println!();
    println_colored!(GOLD, "  Today — {}", today.format("%Y-%m-%d"));
    println!();
    for prayer in PrayerType::all() {
        match logs.iter().find(|l| l.prayer == prayer) {
            Some(log) => {
                let color = match log.status {
                    PrayerStatus::OnTime => GREEN,
                    PrayerStatus::Delayed | PrayerStatus::Qadaa => AMBER,
                    PrayerStatus::Missed => RED,
                };
                let jamaah = if log.in_congregation() { "  (jamaah)" } else { "" };
                println_colored!(
                    color,
                    "  {:<10}  {}{}",
                    prayer.display_name(),
                    log.status.display_name(),
                    jamaah
                );
            }
            None => println_colored!(DIM, "  {:<10}  —", prayer.display_name()),
        }
    }
    println!();
    println_colored!(
        BOLD,
        "  {}  {}  ({} pts, {})",
        progress_bar(perf.logged_count as u32, 5, 10),
        perf.label.display_name(),
        perf.daily_points,
        format_percent(perf.points_percentage)
    );
    println!();
    Ok(())
}

// ─── Streak ──────────────────────────────────────────────────────────────────

pub fn handle_streak(conn: &Connection, config: &AppConfig) -> Result<()> {
    let completion = PrayerLogRepo::completion_map(conn)?;
    let info = streak::compute(&completion, Local::now().date_naive());

    println!();
    println_colored!(
        BOLD,
        "  Streak: {} days current  |  {} days longest",
        info.current,
        info.longest
    );
    if let Some(last) = info.last_prayed_date {
        println_colored!(DIM, "  Last prayed: {}", last.format("%Y-%m-%d"));
    }
    let next = config
        .streak
        .milestones
        .iter()
        .find(|m| **m > info.current);
    if let Some(next) = next {
        println_colored!(DIM, "  Next milestone: {} days", next);
    }
    println!();
    Ok(())
}

// ─── Heatmap ─────────────────────────────────────────────────────────────────

pub fn handle_heatmap(conn: &Connection, config: &AppConfig, days: u32) -> Result<()> {
    let today = Local::now().date_naive();
    let start = today - Duration::days(days.saturating_sub(1) as i64);
    let mut counts = PrayerLogRepo::daily_counts(conn, start, today)?;
    // anchor the window even when its edges have no activity
    counts.entry(start).or_insert(0);
    counts.entry(today).or_insert(0);

    let weeks = heatmap::aggregate(&counts, &config.heatmap);

    println!();
    println_colored!(GOLD, "  Prayer heatmap — last {} days", days);
    println_colored!(DIM, "  Mon..Sun, · = 0 prayers, █ = 5");
    println!();
    for week in &weeks {
        print!("  ");
        for cell in week.padded_cells() {
            match cell {
                Some(day) => print!("{} ", level_glyph(day.level)),
                None => print!("  "),
            }
        }
        if let Some(first) = week.days.first() {
            println_colored!(DIM, "  {}", first.date.format("%b %d"));
        } else {
            println!();
        }
    }
    println!();
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, month: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let window = if month { 30 } else { 7 };
    let start = today - Duration::days(window - 1);
    let logs = PrayerLogRepo::list_range(conn, start, today)?;
    let summary = stats::period_stats(start, today, &logs, month);

    println!();
    println_colored!(
        GOLD,
        "  {} — {} to {}",
        if month { "Monthly stats" } else { "Weekly stats" },
        start.format("%Y-%m-%d"),
        today.format("%Y-%m-%d")
    );
    println!();
    println_colored!(
        BOLD,
        "  Logged:      {}/{} ({})",
        summary.prayers_logged,
        summary.total_prayers,
        format_percent(summary.completion_percentage)
    );
    println!("  On time:     {}", format_percent(summary.on_time_percentage));
    println!("  In jamaah:   {}", format_percent(summary.jamaah_percentage));
    if let Some(best) = summary.best_day {
        println_colored!(GREEN, "  Best day:    {}", best.format("%Y-%m-%d"));
    }
    if let Some(worst) = summary.worst_day {
        println_colored!(AMBER, "  Worst day:   {}", worst.format("%Y-%m-%d"));
    }
    if let Some(avg) = summary.daily_average {
        println!("  Daily avg:   {} logs", avg);
    }
    println!();
    Ok(())
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub fn handle_habit(conn: &Connection, config: &AppConfig, action: &HabitCommands) -> Result<()> {
    match action {
        HabitCommands::List => {
            let habits = HabitRepo::list_active(conn)?;
            let today = Local::now().date_naive();
            let logs = HabitLogRepo::list_range(conn, today, today)?;
            println!();
            println_colored!(GOLD, "  Sunnah habits");
            println!();
            for habit in &habits {
                let logged = logs.iter().find(|l| l.habit_id == habit.id);
                let status = match logged {
                    Some(l) => format!("{}{}\x1b[0m", GREEN, l.level.display_name()),
                    None => format!("{}—\x1b[0m", DIM),
                };
                println!("  {:<28}  {}", habit.name, status);
                for level in HabitLevel::all() {
                    println_colored!(
                        DIM,
                        "      {:<10}  {}",
                        level.display_name(),
                        habit.tier_description(level)
                    );
                }
            }
            println!();
        }
        HabitCommands::Log {
            name,
            level,
            reflection,
            date,
        } => {
            let habit = HabitRepo::find_by_name(conn, name)?
                .ok_or_else(|| anyhow!("Habit '{}' not found", name))?;
            let level = HabitLevel::from_str(level)
                .map_err(|_| anyhow!("Unknown level '{}'. Use: basic, companion, prophetic", level))?;
            let date = parse_cli_date(date)?;

            HabitLogRepo::submit(
                conn,
                &HabitLog {
                    id: None,
                    habit_id: habit.id,
                    date,
                    level,
                    reflection: reflection.clone(),
                },
            )?;
            println_colored!(
                GREEN,
                "  ✓ {} — {} tier: {}",
                habit.name,
                level.display_name(),
                habit.tier_description(level)
            );

            announce_habit_milestones(conn, config, habit.id)?;
        }
        HabitCommands::Top { days, limit } => {
            let today = Local::now().date_naive();
            let start = today - Duration::days(days.saturating_sub(1) as i64);
            let logs = HabitLogRepo::list_range(conn, start, today)?;
            let habits = HabitRepo::list_active(conn)?;
            let ranked = sunnah::top_habits(&logs, start, today, *limit);
            let dist = sunnah::level_distribution(&logs);

            println!();
            println_colored!(GOLD, "  Top habits — last {} days", days);
            println!();
            if ranked.is_empty() {
                println_colored!(DIM, "  No habit logs yet");
            }
            for (i, entry) in ranked.iter().enumerate() {
                let name = habits
                    .iter()
                    .find(|h| h.id == entry.habit_id)
                    .map(|h| h.name.as_str())
                    .unwrap_or("(removed)");
                println!("  {}. {:<28}  {} days", i + 1, name, entry.count);
            }
            println!();
            println_colored!(
                DIM,
                "  Tiers: {} basic, {} companion, {} prophetic ({} logs)",
                dist.basic,
                dist.companion,
                dist.prophetic,
                dist.total()
            );
            println!();
        }
        HabitCommands::Add {
            name,
            basic,
            companion,
            prophetic,
        } => {
            HabitRepo::add_custom(conn, name, basic, companion, prophetic)?;
            println_colored!(GREEN, "  ✓ Added habit: {}", name);
        }
    }
    Ok(())
}

fn announce_habit_milestones(conn: &Connection, config: &AppConfig, habit_id: i64) -> Result<()> {
    let all_logs = HabitLogRepo::list_all(conn)?;
    let habits = HabitRepo::list_active(conn)?;

    let mut found = sunnah::streak_milestones(habit_id, &all_logs, &config.streak.milestones);
    found.extend(sunnah::tier_upgrades(habit_id, &all_logs));
    found.extend(sunnah::category_completions(&habits, &all_logs));

    for fresh in MilestoneRepo::record_new(conn, &found)? {
        let text = match fresh.kind {
            MilestoneKind::StreakSeven => "7-day habit streak".to_string(),
            MilestoneKind::StreakThirty => "30-day habit streak".to_string(),
            MilestoneKind::StreakHundred => "100-day habit streak".to_string(),
            MilestoneKind::TierUpgrade => "tier upgrade".to_string(),
            MilestoneKind::CategoryComplete => {
                format!("every habit logged on {}", fresh.threshold_date)
            }
        };
        println_colored!(GOLD, "  ★ Milestone: {}", text);
    }
    Ok(())
}

// ─── Qibla ───────────────────────────────────────────────────────────────────

pub fn handle_qibla(config: &AppConfig, mag: &Option<String>) -> Result<()> {
    let provider = ConfigLocation::new(&config.location);
    let position = match provider.current_position() {
        Ok(pos) => pos,
        Err(err) => {
            // direction degrades on its own; the tracker is unaffected
            println_colored!(AMBER, "  Qibla unavailable: {}", err);
            return Ok(());
        }
    };

    let sample = match mag {
        Some(raw) => Some(parse_mag(raw)?),
        None => None,
    };

    println!();
    println_colored!(GOLD, "  Qibla — from {}", config.location.location_name);
    println!();
    match sample {
        Some(sample) => {
            let mut source = FixedHeading(sample);
            match source.sample() {
                Ok(sample) => {
                    let data = qibla::compute(position, sample, &config.qibla);
                    println_colored!(BOLD, "  Bearing:   {:.1}°", data.bearing_degrees);
                    println!("  Heading:   {:.1}°", data.device_heading_degrees);
                    println!("  Turn:      {:.1}°", data.offset_degrees);
                    println!("  Distance:  {:.0} km", data.distance_km);
                    println_colored!(
                        DIM,
                        "  Accuracy:  {}",
                        data.accuracy_tier.display_name()
                    );
                }
                Err(SensorError::PermissionDenied) | Err(SensorError::Unavailable(_)) => {
                    print_bearing_only(position, config);
                }
            }
        }
        None => print_bearing_only(position, config),
    }
    println!();
    Ok(())
}

fn print_bearing_only(position: crate::models::Position, config: &AppConfig) {
    let bearing = qibla::initial_bearing(
        position.latitude,
        position.longitude,
        config.qibla.kaaba_latitude,
        config.qibla.kaaba_longitude,
    );
    let distance = qibla::haversine_km(
        position.latitude,
        position.longitude,
        config.qibla.kaaba_latitude,
        config.qibla.kaaba_longitude,
    );
    println_colored!(BOLD, "  Bearing:   {:.1}°", bearing);
    println!("  Distance:  {:.0} km", distance);
    println_colored!(DIM, "  Heading:   unavailable (pass --mag x,y,z)");
}

fn parse_mag(raw: &str) -> Result<crate::models::MagnetometerSample> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(anyhow!("--mag expects x,y,z"));
    }
    Ok(crate::models::MagnetometerSample {
        x: parts[0].parse()?,
        y: parts[1].parse()?,
        z: parts[2].parse()?,
    })
}

// ─── Hijri ───────────────────────────────────────────────────────────────────

pub fn handle_hijri(config: &AppConfig, date: &Option<String>) -> Result<()> {
    let gregorian = parse_cli_date(date)?;
    let h = hijri::to_hijri_with_offset(gregorian, config.location.hijri_offset);
    println!();
    println_colored!(GOLD, "  {}", h.formatted());
    println_colored!(DIM, "  ({} Gregorian, tabular calendar)", gregorian.format("%Y-%m-%d"));
    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn handle_export(conn: &Connection, config: &AppConfig) -> Result<()> {
    let today = Local::now().date_naive();
    let week_start = today - Duration::days(6);

    let logs = PrayerLogRepo::list_range(conn, week_start, today)?;
    let summary = stats::period_stats(week_start, today, &logs, false);
    let completion = PrayerLogRepo::completion_map(conn)?;
    let streak_info = streak::compute(&completion, today);
    let perf = performance::score_day(
        today,
        &logs.iter().filter(|l| l.date == today).cloned().collect::<Vec<_>>(),
        &config.scoring,
    );
    let habit_logs = HabitLogRepo::list_range(conn, week_start, today)?;
    let dist = sunnah::level_distribution(&habit_logs);

    let export = serde_json::json!({
        "date": today.format("%Y-%m-%d").to_string(),
        "hijri": hijri::to_hijri_with_offset(today, config.location.hijri_offset).formatted(),
        "streak": streak_info,
        "week": summary,
        "today": perf,
        "today_color": perf.label.color_tag(),
        "milestones_recorded": MilestoneRepo::count(conn)?,
        "habit_tiers": {
            "basic": dist.basic,
            "companion": dist.companion,
            "prophetic": dist.prophetic,
        },
    });
    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}
