use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Habit, HabitLevel, HabitLog, Milestone, MilestoneKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelDistribution {
    pub basic: u32,
    pub companion: u32,
    pub prophetic: u32,
}

impl LevelDistribution {
    pub fn total(&self) -> u32 {
        self.basic + self.companion + self.prophetic
    }
}

/// Per-tier counts over a set of habit logs. Each log row counts once;
/// same-day resubmission already collapsed to one row by the store.
pub fn level_distribution(logs: &[HabitLog]) -> LevelDistribution {
    let mut dist = LevelDistribution::default();
    for log in logs {
        match log.level {
            HabitLevel::Basic => dist.basic += 1,
            HabitLevel::Companion => dist.companion += 1,
            HabitLevel::Prophetic => dist.prophetic += 1,
        }
    }
    dist
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopHabit {
    pub habit_id: i64,
    pub count: u32,
}

/// Rank habits by log count over a trailing window, descending. Ties are
/// broken by habit id ascending so the ranking is deterministic.
pub fn top_habits(
    logs: &[HabitLog],
    window_start: NaiveDate,
    window_end: NaiveDate,
    limit: usize,
) -> Vec<TopHabit> {
    let mut counts: BTreeMap<i64, u32> = BTreeMap::new();
    for log in logs {
        if log.date >= window_start && log.date <= window_end {
            *counts.entry(log.habit_id).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<TopHabit> = counts
        .into_iter()
        .map(|(habit_id, count)| TopHabit { habit_id, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.habit_id.cmp(&b.habit_id)));
    ranked.truncate(limit);
    ranked
}

fn habit_subject(habit_id: i64) -> String {
    format!("habit:{}", habit_id)
}

/// Every date at which a consecutive-day run for this habit crossed one of
/// the milestone thresholds. Any tier counts as a completed day. The
/// output is a pure function of the history, so callers can re-evaluate
/// freely; the store de-duplicates on (subject, kind, threshold_date).
pub fn streak_milestones(habit_id: i64, logs: &[HabitLog], milestones: &[u32]) -> Vec<Milestone> {
    let days: BTreeSet<NaiveDate> = logs
        .iter()
        .filter(|l| l.habit_id == habit_id)
        .map(|l| l.date)
        .collect();

    let mut out = Vec::new();
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for date in &days {
        let adjacent = prev.and_then(|p| p.succ_opt()) == Some(*date);
        run = if adjacent { run + 1 } else { 1 };
        if let Some(threshold) = milestones.iter().find(|m| **m == run) {
            if let Some(kind) = MilestoneKind::from_streak_threshold(*threshold) {
                out.push(Milestone {
                    subject_id: habit_subject(habit_id),
                    kind,
                    threshold_date: *date,
                });
            }
        }
        prev = Some(*date);
    }
    out
}

/// Dates where a habit was first logged at a tier above every earlier log.
/// The very first log is a starting point, not an upgrade.
pub fn tier_upgrades(habit_id: i64, logs: &[HabitLog]) -> Vec<Milestone> {
    let mut history: Vec<&HabitLog> = logs.iter().filter(|l| l.habit_id == habit_id).collect();
    history.sort_by_key(|l| l.date);

    let mut out = Vec::new();
    let mut best: Option<HabitLevel> = None;
    for log in history {
        match best {
            Some(prev) if log.level > prev => {
                out.push(Milestone {
                    subject_id: habit_subject(habit_id),
                    kind: MilestoneKind::TierUpgrade,
                    threshold_date: log.date,
                });
                best = Some(log.level);
            }
            Some(_) => {}
            None => best = Some(log.level),
        }
    }
    out
}

/// Dates on which every active habit of a category was logged.
pub fn category_completions(habits: &[Habit], logs: &[HabitLog]) -> Vec<Milestone> {
    let mut out = Vec::new();
    for category in ["builtin", "custom"] {
        let members: BTreeSet<i64> = habits
            .iter()
            .filter(|h| h.active && h.category.as_str() == category)
            .map(|h| h.id)
            .collect();
        if members.is_empty() {
            continue;
        }

        let mut by_date: BTreeMap<NaiveDate, BTreeSet<i64>> = BTreeMap::new();
        for log in logs {
            if members.contains(&log.habit_id) {
                by_date.entry(log.date).or_default().insert(log.habit_id);
            }
        }

        for (date, logged) in by_date {
            if logged.len() == members.len() {
                out.push(Milestone {
                    subject_id: format!("category:{}", category),
                    kind: MilestoneKind::CategoryComplete,
                    threshold_date: date,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HabitCategory;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn hlog(habit_id: i64, day: u32, level: HabitLevel) -> HabitLog {
        HabitLog {
            id: None,
            habit_id,
            date: d(day),
            level,
            reflection: None,
        }
    }

    #[test]
    fn distribution_counts_each_tier() {
        let logs = vec![
            hlog(1, 1, HabitLevel::Basic),
            hlog(1, 2, HabitLevel::Basic),
            hlog(1, 3, HabitLevel::Companion),
            hlog(2, 3, HabitLevel::Prophetic),
        ];
        let dist = level_distribution(&logs);
        assert_eq!(dist.basic, 2);
        assert_eq!(dist.companion, 1);
        assert_eq!(dist.prophetic, 1);
        assert_eq!(dist.total(), 4);
    }

    #[test]
    fn top_habits_ranked_by_count_then_id() {
        let logs = vec![
            hlog(3, 1, HabitLevel::Basic),
            hlog(3, 2, HabitLevel::Basic),
            hlog(1, 3, HabitLevel::Basic),
            hlog(1, 4, HabitLevel::Basic),
            hlog(2, 5, HabitLevel::Basic),
            // outside the window, ignored
            hlog(2, 29, HabitLevel::Basic),
        ];
        let ranked = top_habits(&logs, d(1), d(10), 10);
        // habits 1 and 3 tie at 2 logs; lower id wins the tie
        assert_eq!(ranked[0], TopHabit { habit_id: 1, count: 2 });
        assert_eq!(ranked[1], TopHabit { habit_id: 3, count: 2 });
        assert_eq!(ranked[2], TopHabit { habit_id: 2, count: 1 });
    }

    #[test]
    fn streak_milestone_emitted_at_each_crossing() {
        let logs: Vec<HabitLog> = (1..=9).map(|day| hlog(1, day, HabitLevel::Basic)).collect();
        let found = streak_milestones(1, &logs, &[7, 30, 100]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, MilestoneKind::StreakSeven);
        assert_eq!(found[0].threshold_date, d(7));
        assert_eq!(found[0].subject_id, "habit:1");
    }

    #[test]
    fn streak_milestones_are_stable_under_reevaluation() {
        let logs: Vec<HabitLog> = (1..=8).map(|day| hlog(1, day, HabitLevel::Basic)).collect();
        let first = streak_milestones(1, &logs, &[7, 30, 100]);
        let second = streak_milestones(1, &logs, &[7, 30, 100]);
        assert_eq!(first, second);
    }

    #[test]
    fn gap_resets_habit_run() {
        let mut logs: Vec<HabitLog> = (1..=6).map(|day| hlog(1, day, HabitLevel::Basic)).collect();
        // day 7 missing, then more logs
        logs.extend((8..=14).map(|day| hlog(1, day, HabitLevel::Basic)));
        let found = streak_milestones(1, &logs, &[7]);
        // second run reaches 7 on day 14
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].threshold_date, d(14));
    }

    #[test]
    fn tier_upgrade_only_on_new_high() {
        let logs = vec![
            hlog(1, 1, HabitLevel::Basic),
            hlog(1, 2, HabitLevel::Companion),
            hlog(1, 3, HabitLevel::Basic),
            hlog(1, 4, HabitLevel::Companion),
            hlog(1, 5, HabitLevel::Prophetic),
        ];
        let ups = tier_upgrades(1, &logs);
        assert_eq!(ups.len(), 2);
        assert_eq!(ups[0].threshold_date, d(2));
        assert_eq!(ups[1].threshold_date, d(5));
    }

    #[test]
    fn category_complete_requires_every_member() {
        let habit = |id: i64| Habit {
            id,
            name: format!("habit-{}", id),
            category: HabitCategory::Builtin,
            basic_desc: String::new(),
            companion_desc: String::new(),
            prophetic_desc: String::new(),
            sort_order: 0,
            active: true,
        };
        let habits = vec![habit(1), habit(2)];
        let logs = vec![
            hlog(1, 1, HabitLevel::Basic),
            hlog(1, 2, HabitLevel::Basic),
            hlog(2, 2, HabitLevel::Companion),
        ];
        let found = category_completions(&habits, &logs);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].threshold_date, d(2));
        assert_eq!(found[0].subject_id, "category:builtin");
    }
}
