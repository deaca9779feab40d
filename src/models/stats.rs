use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MANTRAS_PER_MALA: u32 = 108;
pub const DEFAULT_GOAL_MALAS: u32 = 3;
pub const MIN_GOAL_MALAS: u32 = 1;
pub const MAX_GOAL_MALAS: u32 = 108;

pub const DATE_FMT: &str = "%Y-%m-%d";

pub fn date_str(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

/// One history entry per calendar date the practice was active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: String,
    pub mantras: u64,
    pub malas: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements {
    pub first_mala: bool,
    pub ten_malas: bool,
    pub fifty_malas: bool,
    pub hundred_malas: bool,
    pub consistent_week: bool,
}

/// Lifetime + daily practice statistics. Persisted as one JSON blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_mantras: u64,
    pub total_malas: u64,
    pub daily_mantras: u64,
    pub daily_malas: u64,
    pub goal_malas: u32,
    pub streak: u32,
    /// Date of the last mutation, YYYY-MM-DD. Used to detect day rollover.
    pub last_updated: String,
    pub history: Vec<DayRecord>,
    pub achievements: Achievements,
}

impl Stats {
    /// Default stats for a first run: everything zero, one empty entry for today.
    pub fn fresh(today: NaiveDate) -> Self {
        let date = date_str(today);
        Stats {
            total_mantras: 0,
            total_malas: 0,
            daily_mantras: 0,
            daily_malas: 0,
            goal_malas: DEFAULT_GOAL_MALAS,
            streak: 0,
            last_updated: date.clone(),
            history: vec![DayRecord {
                date,
                mantras: 0,
                malas: 0,
            }],
            achievements: Achievements::default(),
        }
    }

    pub fn day_record(&self, date: &str) -> Option<&DayRecord> {
        self.history.iter().find(|d| d.date == date)
    }

    /// History entry for `date`, appending a zeroed one if absent.
    /// History holds at most one entry per date.
    pub fn ensure_day(&mut self, date: &str) -> &mut DayRecord {
        let idx = match self.history.iter().position(|d| d.date == date) {
            Some(idx) => idx,
            None => {
                self.history.push(DayRecord {
                    date: date.to_string(),
                    mantras: 0,
                    malas: 0,
                });
                self.history.len() - 1
            }
        };
        &mut self.history[idx]
    }

    /// Day-boundary rollover: zero the daily counters and open a fresh history
    /// entry for `today`. Totals, streak and achievements are untouched.
    /// Returns true if a rollover happened.
    pub fn reconcile_day(&mut self, today: NaiveDate) -> bool {
        let date = date_str(today);
        if self.last_updated == date {
            return false;
        }
        self.daily_mantras = 0;
        self.daily_malas = 0;
        self.ensure_day(&date);
        self.last_updated = date;
        true
    }
}

/// The persisted practice snapshot: the bead position within the current mala
/// plus the full stats. Stored under a single key so a command-line tap
/// session resumes where the last one left off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub current_count: u32,
    pub stats: Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fresh_stats_have_one_today_entry() {
        let stats = Stats::fresh(d(2025, 6, 1));
        assert_eq!(stats.history.len(), 1);
        assert_eq!(stats.history[0].date, "2025-06-01");
        assert_eq!(stats.last_updated, "2025-06-01");
        assert_eq!(stats.goal_malas, DEFAULT_GOAL_MALAS);
    }

    #[test]
    fn ensure_day_never_duplicates() {
        let mut stats = Stats::fresh(d(2025, 6, 1));
        stats.ensure_day("2025-06-01").mantras += 1;
        stats.ensure_day("2025-06-01").mantras += 1;
        assert_eq!(stats.history.len(), 1);
        assert_eq!(stats.history[0].mantras, 2);
    }

    #[test]
    fn reconcile_day_rolls_over_once() {
        let mut stats = Stats::fresh(d(2025, 6, 1));
        stats.daily_mantras = 42;
        stats.daily_malas = 1;
        stats.total_mantras = 42;
        stats.total_malas = 1;
        stats.history[0].mantras = 42;
        stats.history[0].malas = 1;

        assert!(stats.reconcile_day(d(2025, 6, 2)));
        assert_eq!(stats.daily_mantras, 0);
        assert_eq!(stats.daily_malas, 0);
        assert_eq!(stats.total_mantras, 42);
        assert_eq!(stats.total_malas, 1);
        assert_eq!(stats.last_updated, "2025-06-02");
        assert_eq!(stats.history.len(), 2);
        // yesterday's entry unchanged
        assert_eq!(stats.history[0].mantras, 42);

        // second call on the same day is a no-op
        assert!(!stats.reconcile_day(d(2025, 6, 2)));
        assert_eq!(stats.history.len(), 2);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut stats = Stats::fresh(d(2025, 6, 1));
        stats.total_mantras = 216;
        stats.total_malas = 2;
        stats.achievements.first_mala = true;
        let snap = Snapshot {
            current_count: 17,
            stats,
        };
        let raw = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, snap);
    }
}
