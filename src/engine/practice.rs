use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::SnapshotRepo;
use crate::engine::autocount::AutoCounter;
use crate::engine::events::{EngineEvent, Pulse};
use crate::engine::{achievements, streak, EngineError};
use crate::models::{
    date_str, Snapshot, Stats, MANTRAS_PER_MALA, MAX_GOAL_MALAS, MIN_GOAL_MALAS,
};

/// Session-scoped state: lives for one run of the app, except the bead
/// position which rides along in the persisted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Taps since the last mala completion, always in 0..108.
    pub current_count: u32,
    /// Malas completed this session.
    pub current_mala_count: u32,
    pub is_playing: bool,
    pub playback_speed: f64,
    pub auto_count_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub base_interval: Duration,
    pub haptics: bool,
    pub default_speed: f64,
}

impl EngineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            base_interval: config.base_interval(),
            haptics: config.practice.haptics,
            default_speed: config.audio.speed,
        }
    }
}

/// The practice state engine. Owns the counters, stats, streak and
/// achievement state; every operation runs to completion on the caller's
/// turn and queues its side effects as [`EngineEvent`]s.
///
/// Constructed once per run and handed by reference to the TUI and the CLI
/// handlers. Persists a snapshot after every mutation, best-effort.
pub struct PracticeEngine {
    session: Session,
    stats: Stats,
    auto: AutoCounter,
    events: VecDeque<EngineEvent>,
    haptics: bool,
}

impl PracticeEngine {
    /// Rehydrate from the store (or defaults on first run / unreadable blob)
    /// and run the day-boundary reconciliation.
    pub fn load(conn: &Connection, today: NaiveDate, opts: &EngineOptions) -> Self {
        let snapshot = SnapshotRepo::load(conn).unwrap_or_else(|e| {
            log::warn!("Could not read practice snapshot: {}", e);
            None
        });
        let first_run = snapshot.is_none();
        let (current_count, stats) = match snapshot {
            Some(snap) => (snap.current_count % MANTRAS_PER_MALA, snap.stats),
            None => (0, Stats::fresh(today)),
        };

        let mut engine = PracticeEngine {
            session: Session {
                current_count,
                current_mala_count: 0,
                is_playing: false,
                playback_speed: if opts.default_speed > 0.0 {
                    opts.default_speed
                } else {
                    1.0
                },
                auto_count_enabled: false,
            },
            stats,
            auto: AutoCounter::new(opts.base_interval),
            events: VecDeque::new(),
            haptics: opts.haptics,
        };

        if engine.stats.reconcile_day(today) || first_run {
            engine.persist(conn);
        }
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn best_streak(&self) -> u32 {
        streak::best_streak(&self.stats.history)
    }

    /// Drain the queued side effects. The caller processes them after the
    /// mutation that produced them has fully returned.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Record one recitation. Callable at any time, playing or paused.
    pub fn increment(&mut self, conn: &Connection, today: NaiveDate) {
        // A stale load (app left open across midnight) reconciles before the
        // first count of the new day lands.
        self.reconcile_day(conn, today);

        if self.haptics {
            self.events.push_back(EngineEvent::Haptic(Pulse::Soft));
        }

        self.session.current_count += 1;
        let mala_completed = self.session.current_count == MANTRAS_PER_MALA;
        if mala_completed {
            self.session.current_count = 0;
            self.session.current_mala_count += 1;
            if self.haptics {
                self.events.push_back(EngineEvent::Haptic(Pulse::Strong));
            }
            self.events.push_back(EngineEvent::Chime);
            self.events.push_back(EngineEvent::MalaCompleted {
                session_malas: self.session.current_mala_count,
            });
        }

        let date = date_str(today);
        let entry = self.stats.ensure_day(&date);
        entry.mantras += 1;
        if mala_completed {
            entry.malas += 1;
        }

        self.stats.total_mantras += 1;
        self.stats.daily_mantras += 1;
        if mala_completed {
            self.stats.total_malas += 1;
            self.stats.daily_malas += 1;
            // Fires exactly once per day per goal value: only the count that
            // lands on the goal matches, counts past it do not.
            if self.stats.daily_malas == u64::from(self.stats.goal_malas) {
                self.events.push_back(EngineEvent::GoalAchieved {
                    goal: self.stats.goal_malas,
                });
            }
        }
        self.stats.last_updated = date;
        self.stats.streak = streak::current_streak(&self.stats.history, today);

        self.persist(conn);
        self.refresh_achievements(conn);
    }

    /// Day-boundary reconciliation, run on load and lazily before a count.
    pub fn reconcile_day(&mut self, conn: &Connection, today: NaiveDate) {
        if self.stats.reconcile_day(today) {
            self.persist(conn);
        }
    }

    /// The playback driver reported end of track: one recitation done.
    /// Returns whether the caller should restart the track (loop-by-hand).
    pub fn track_ended(&mut self, conn: &Connection, today: NaiveDate) -> bool {
        self.increment(conn, today);
        self.session.is_playing
    }

    /// Auto-count: fire any increments that came due. Returns how many fired.
    pub fn tick(&mut self, conn: &Connection, today: NaiveDate, now: Instant) -> u32 {
        let fires = self.auto.poll(now);
        for _ in 0..fires {
            self.increment(conn, today);
        }
        fires
    }

    pub fn toggle_playback(&mut self, now: Instant) {
        self.session.is_playing = !self.session.is_playing;
        self.events.push_back(EngineEvent::PlaybackToggled {
            playing: self.session.is_playing,
        });
        self.rearm_autocount(now);
    }

    /// The driver could not actually start; keep `is_playing` in line with it.
    pub fn playback_failed(&mut self, reason: &str, now: Instant) {
        self.session.is_playing = false;
        self.events.push_back(EngineEvent::PlaybackFailed {
            reason: reason.to_string(),
        });
        self.rearm_autocount(now);
    }

    pub fn set_playback_speed(&mut self, speed: f64, now: Instant) -> Result<(), EngineError> {
        if speed <= 0.0 || !speed.is_finite() {
            return Err(EngineError::NonPositiveSpeed(speed));
        }
        self.session.playback_speed = speed;
        self.events.push_back(EngineEvent::SpeedChanged { speed });
        self.rearm_autocount(now);
        Ok(())
    }

    pub fn set_goal_malas(&mut self, conn: &Connection, goal: u32) -> Result<(), EngineError> {
        if !(MIN_GOAL_MALAS..=MAX_GOAL_MALAS).contains(&goal) {
            return Err(EngineError::GoalOutOfRange(goal));
        }
        self.stats.goal_malas = goal;
        self.persist(conn);
        self.events.push_back(EngineEvent::GoalChanged { goal });
        Ok(())
    }

    /// Zero the session counters only. Daily/total stats and history are a
    /// different thing and stay untouched.
    pub fn reset_daily_count(&mut self, conn: &Connection) {
        self.session.current_count = 0;
        self.session.current_mala_count = 0;
        self.persist(conn);
        self.events.push_back(EngineEvent::SessionReset);
    }

    /// Destructive full reset: stats replaced with defaults (goal included),
    /// one fresh entry for today kept in history. The confirmation gate lives
    /// at the boundary — callers invoke this only after the user confirmed.
    pub fn reset_all(&mut self, conn: &Connection, today: NaiveDate) {
        self.session.current_count = 0;
        self.session.current_mala_count = 0;
        self.stats = Stats::fresh(today);
        self.persist(conn);
        self.events.push_back(EngineEvent::AllReset);
    }

    pub fn toggle_auto_repeat(&mut self, now: Instant) {
        self.session.auto_count_enabled = !self.session.auto_count_enabled;
        self.events.push_back(EngineEvent::AutoRepeatToggled {
            enabled: self.session.auto_count_enabled,
        });
        self.rearm_autocount(now);
    }

    // ── Internals ────────────────────────────────────────────────────

    fn rearm_autocount(&mut self, now: Instant) {
        self.auto.rearm(
            self.session.is_playing && self.session.auto_count_enabled,
            self.session.playback_speed,
            now,
        );
    }

    /// Recompute achievements from the stats and announce each newly earned
    /// flag once. Merging keeps the flags monotonic.
    fn refresh_achievements(&mut self, conn: &Connection) {
        let prev = self.stats.achievements;
        let next = achievements::merge(prev, achievements::derive(&self.stats));
        let newly = achievements::newly_unlocked(prev, next);
        if !newly.is_empty() {
            self.stats.achievements = next;
            for a in newly {
                self.events.push_back(EngineEvent::AchievementUnlocked(a));
            }
            self.persist(conn);
        }
    }

    /// Best-effort write. A failed write never interrupts the session.
    fn persist(&self, conn: &Connection) {
        let snapshot = Snapshot {
            current_count: self.session.current_count,
            stats: self.stats.clone(),
        };
        if let Err(e) = SnapshotRepo::save(conn, &snapshot) {
            log::warn!("Failed to persist practice snapshot: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::engine::achievements::Achievement;
    use crate::models::DEFAULT_GOAL_MALAS;

    const BASE: Duration = Duration::from_millis(5000);

    fn opts() -> EngineOptions {
        EngineOptions {
            base_interval: BASE,
            haptics: true,
            default_speed: 1.0,
        }
    }

    fn mem_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fresh_engine(conn: &Connection, today: NaiveDate) -> PracticeEngine {
        PracticeEngine::load(conn, today, &opts())
    }

    fn tap(engine: &mut PracticeEngine, conn: &Connection, today: NaiveDate, n: u32) {
        for _ in 0..n {
            engine.increment(conn, today);
        }
    }

    #[test]
    fn one_increment() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        engine.increment(&conn, today);

        assert_eq!(engine.session().current_count, 1);
        assert_eq!(engine.stats().total_mantras, 1);
        assert_eq!(engine.stats().daily_mantras, 1);
        assert_eq!(engine.stats().streak, 1);
        let entry = engine.stats().day_record("2025-06-01").unwrap();
        assert_eq!(entry.mantras, 1);
        assert_eq!(entry.malas, 0);
    }

    #[test]
    fn full_mala_rolls_over() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        tap(&mut engine, &conn, today, 108);

        assert_eq!(engine.session().current_count, 0);
        assert_eq!(engine.session().current_mala_count, 1);
        assert_eq!(engine.stats().total_malas, 1);
        assert_eq!(engine.stats().daily_malas, 1);
        assert_eq!(engine.stats().total_mantras, 108);
        let today_entries: Vec<_> = engine
            .stats()
            .history
            .iter()
            .filter(|e| e.date == "2025-06-01")
            .collect();
        assert_eq!(today_entries.len(), 1);
        assert_eq!(today_entries[0].mantras, 108);
        assert_eq!(today_entries[0].malas, 1);

        let events = engine.take_events();
        assert!(events.contains(&EngineEvent::MalaCompleted { session_malas: 1 }));
        assert!(events.contains(&EngineEvent::Chime));
        assert!(events.contains(&EngineEvent::Haptic(Pulse::Strong)));
    }

    #[test]
    fn count_stays_in_range_and_rollovers_match_totals() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        for i in 1..=350u32 {
            engine.increment(&conn, today);
            let count = engine.session().current_count;
            assert!(count < MANTRAS_PER_MALA, "count out of range at tap {}", i);
        }
        assert_eq!(engine.stats().total_malas, 3);
        assert_eq!(engine.session().current_count, 350 - 3 * 108);
    }

    #[test]
    fn dailies_stay_in_lockstep_with_today_entry() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        for _ in 0..250 {
            engine.increment(&conn, today);
            let stats = engine.stats();
            let entry = stats.day_record("2025-06-01").unwrap();
            assert_eq!(entry.mantras, stats.daily_mantras);
            assert_eq!(entry.malas, stats.daily_malas);
        }
    }

    #[test]
    fn day_boundary_reconciliation_on_stale_state() {
        let conn = mem_conn();
        let yesterday = d(2025, 6, 1);
        let today = d(2025, 6, 2);

        let mut engine = fresh_engine(&conn, yesterday);
        tap(&mut engine, &conn, yesterday, 42);
        assert_eq!(engine.stats().daily_mantras, 42);
        drop(engine);

        // reload on the next day
        let mut engine = fresh_engine(&conn, today);
        assert_eq!(engine.stats().daily_mantras, 0);
        assert_eq!(engine.stats().total_mantras, 42);

        engine.increment(&conn, today);
        assert_eq!(engine.stats().daily_mantras, 1);
        let today_entry = engine.stats().day_record("2025-06-02").unwrap();
        assert_eq!(today_entry.mantras, 1);
        let yesterday_entry = engine.stats().day_record("2025-06-01").unwrap();
        assert_eq!(yesterday_entry.mantras, 42);
        assert_eq!(yesterday_entry.malas, 0);
    }

    #[test]
    fn lazy_reconciliation_inside_increment() {
        let conn = mem_conn();
        let yesterday = d(2025, 6, 1);
        let today = d(2025, 6, 2);

        let mut engine = fresh_engine(&conn, yesterday);
        tap(&mut engine, &conn, yesterday, 42);

        // app stayed open across midnight: first increment of the new day
        // reconciles before it counts
        engine.increment(&conn, today);
        assert_eq!(engine.stats().daily_mantras, 1);
        assert_eq!(engine.stats().total_mantras, 43);
        let today_entry = engine.stats().day_record("2025-06-02").unwrap();
        assert_eq!(today_entry.mantras, 1);
        let yesterday_entry = engine.stats().day_record("2025-06-01").unwrap();
        assert_eq!(yesterday_entry.mantras, 42);
    }

    #[test]
    fn goal_achieved_fires_once() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        engine.set_goal_malas(&conn, 1).unwrap();
        engine.take_events();

        tap(&mut engine, &conn, today, 108);
        let events = engine.take_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, EngineEvent::GoalAchieved { .. }))
                .count(),
            1
        );

        // the second mala of the day passes the goal without re-announcing
        tap(&mut engine, &conn, today, 108);
        let events = engine.take_events();
        assert!(events
            .iter()
            .all(|e| !matches!(e, EngineEvent::GoalAchieved { .. })));
    }

    #[test]
    fn first_mala_achievement_announced_once() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        tap(&mut engine, &conn, today, 108);
        let events = engine.take_events();
        assert!(events.contains(&EngineEvent::AchievementUnlocked(Achievement::FirstMala)));

        tap(&mut engine, &conn, today, 108);
        let events = engine.take_events();
        assert!(events
            .iter()
            .all(|e| !matches!(e, EngineEvent::AchievementUnlocked(Achievement::FirstMala))));
        assert!(engine.stats().achievements.first_mala);
    }

    #[test]
    fn achievements_survive_reloads_and_further_mutations() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        tap(&mut engine, &conn, today, 108);
        assert!(engine.stats().achievements.first_mala);
        engine.reset_daily_count(&conn);
        assert!(engine.stats().achievements.first_mala);
        drop(engine);

        let engine = fresh_engine(&conn, today);
        assert!(engine.stats().achievements.first_mala);
    }

    #[test]
    fn reset_daily_count_is_session_only() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        tap(&mut engine, &conn, today, 120);

        engine.reset_daily_count(&conn);
        assert_eq!(engine.session().current_count, 0);
        assert_eq!(engine.session().current_mala_count, 0);
        assert_eq!(engine.stats().total_mantras, 120);
        assert_eq!(engine.stats().total_malas, 1);
        assert_eq!(engine.stats().daily_mantras, 120);
        assert_eq!(engine.stats().history.len(), 1);
    }

    #[test]
    fn reset_all_restores_defaults() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        engine.set_goal_malas(&conn, 11).unwrap();
        tap(&mut engine, &conn, today, 120);

        engine.reset_all(&conn, today);
        assert_eq!(engine.stats().total_mantras, 0);
        assert_eq!(engine.stats().total_malas, 0);
        assert_eq!(engine.stats().goal_malas, DEFAULT_GOAL_MALAS);
        assert_eq!(engine.session().current_count, 0);
        assert_eq!(engine.stats().history.len(), 1);
        assert_eq!(engine.stats().history[0].date, "2025-06-01");
        assert_eq!(engine.stats().history[0].mantras, 0);
    }

    #[test]
    fn goal_zero_and_out_of_range_rejected() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        assert_eq!(
            engine.set_goal_malas(&conn, 0),
            Err(EngineError::GoalOutOfRange(0))
        );
        assert_eq!(
            engine.set_goal_malas(&conn, 109),
            Err(EngineError::GoalOutOfRange(109))
        );
        assert_eq!(engine.stats().goal_malas, DEFAULT_GOAL_MALAS);
    }

    #[test]
    fn nonpositive_speed_rejected() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        let now = Instant::now();
        assert!(engine.set_playback_speed(0.0, now).is_err());
        assert!(engine.set_playback_speed(-1.0, now).is_err());
        assert_eq!(engine.session().playback_speed, 1.0);
    }

    #[test]
    fn autocount_fires_at_scaled_cadence() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        let t0 = Instant::now();

        engine.toggle_playback(t0);
        engine.toggle_auto_repeat(t0);
        engine.set_playback_speed(2.0, t0).unwrap();

        assert_eq!(engine.tick(&conn, today, t0 + Duration::from_millis(2499)), 0);
        assert_eq!(engine.tick(&conn, today, t0 + Duration::from_millis(2500)), 1);
        assert_eq!(engine.stats().total_mantras, 1);

        // disabling auto-count stops further firing, with no further change
        engine.toggle_auto_repeat(t0 + Duration::from_millis(2600));
        assert_eq!(engine.tick(&conn, today, t0 + Duration::from_secs(120)), 0);
        assert_eq!(engine.stats().total_mantras, 1);
    }

    #[test]
    fn autocount_needs_both_flags() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        let t0 = Instant::now();

        engine.toggle_auto_repeat(t0); // auto on, playback off
        assert_eq!(engine.tick(&conn, today, t0 + Duration::from_secs(60)), 0);

        engine.toggle_playback(t0 + Duration::from_secs(60));
        assert_eq!(
            engine.tick(&conn, today, t0 + Duration::from_secs(65)),
            1
        );
    }

    #[test]
    fn track_ended_counts_and_requests_restart() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        let t0 = Instant::now();

        engine.toggle_playback(t0);
        assert!(engine.track_ended(&conn, today));
        assert_eq!(engine.stats().total_mantras, 1);

        engine.toggle_playback(t0);
        assert!(!engine.track_ended(&conn, today));
    }

    #[test]
    fn playback_failure_clears_playing_flag() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        let t0 = Instant::now();

        engine.toggle_playback(t0);
        assert!(engine.session().is_playing);
        engine.playback_failed("decode error", t0);
        assert!(!engine.session().is_playing);
        let events = engine.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::PlaybackFailed { .. })));
    }

    #[test]
    fn snapshot_restores_bead_position() {
        let conn = mem_conn();
        let today = d(2025, 6, 1);
        let mut engine = fresh_engine(&conn, today);
        tap(&mut engine, &conn, today, 17);
        drop(engine);

        let engine = fresh_engine(&conn, today);
        assert_eq!(engine.session().current_count, 17);
        // session malas do not carry across runs
        assert_eq!(engine.session().current_mala_count, 0);
        assert_eq!(engine.stats().total_mantras, 17);
    }

    #[test]
    fn persists_across_a_real_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("japa.db");
        let today = d(2025, 6, 1);

        {
            let conn = Connection::open(&path).unwrap();
            run_migrations(&conn).unwrap();
            let mut engine = fresh_engine(&conn, today);
            tap(&mut engine, &conn, today, 108);
        }

        let conn = Connection::open(&path).unwrap();
        run_migrations(&conn).unwrap();
        let engine = fresh_engine(&conn, today);
        assert_eq!(engine.stats().total_malas, 1);
        assert!(engine.stats().achievements.first_mala);
    }

    #[test]
    fn week_of_practice_unlocks_consistent_week() {
        let conn = mem_conn();
        let mut engine = fresh_engine(&conn, d(2025, 6, 1));
        for day in 1..=7 {
            engine.increment(&conn, d(2025, 6, day));
        }
        assert_eq!(engine.stats().streak, 7);
        assert!(engine.stats().achievements.consistent_week);
    }
}
