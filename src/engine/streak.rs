use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{DayRecord, DATE_FMT};

fn practiced_dates(history: &[DayRecord]) -> HashSet<NaiveDate> {
    history
        .iter()
        .filter(|d| d.mantras >= 1)
        .filter_map(|d| NaiveDate::parse_from_str(&d.date, DATE_FMT).ok())
        .collect()
}

/// Consecutive practiced days ending today. Zero if today has no mantras yet;
/// callers recompute this only after a mutation, so the stored value carries
/// over a day boundary until the first count of the new day.
pub fn current_streak(history: &[DayRecord], today: NaiveDate) -> u32 {
    let practiced = practiced_dates(history);
    let mut streak = 0u32;
    let mut day = today;
    while practiced.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Longest run of consecutive practiced days anywhere in history.
/// Display-only, never persisted.
pub fn best_streak(history: &[DayRecord]) -> u32 {
    let mut dates: Vec<NaiveDate> = practiced_dates(history).into_iter().collect();
    if dates.is_empty() {
        return 0;
    }
    dates.sort();

    let mut best = 1u32;
    let mut current = 1u32;
    for i in 1..dates.len() {
        if Some(dates[i]) == dates[i - 1].succ_opt() {
            current += 1;
        } else {
            current = 1;
        }
        best = best.max(current);
    }
    best
}
