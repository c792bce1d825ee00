//! Aggregate statistics over completed work sessions.
//!
//! Every operation takes the current day as an explicit parameter so the
//! rollover and streak logic is reproducible in tests. The aggregator is
//! the only writer of [`PomodoroStats`].

use chrono::NaiveDate;

use crate::models::{PomodoroSession, PomodoroStats, DAILY_GOAL_MAX, DAILY_GOAL_MIN};
use crate::persistence::Database;

pub struct StatsAggregator {
    stats: PomodoroStats,
}

impl StatsAggregator {
    /// Loads persisted statistics and aligns the weekly window to `today`.
    /// Never fails; a broken record is replaced by defaults.
    pub fn load(db: &Database, today: NaiveDate) -> Self {
        let stats = db.load_stats().unwrap_or_else(|e| {
            eprintln!("Failed to load stats: {e}");
            PomodoroStats::default()
        });
        let mut aggregator = Self { stats };
        if aggregator.rollover(today) {
            aggregator.persist(db);
        }
        aggregator
    }

    pub fn get(&self) -> &PomodoroStats {
        &self.stats
    }

    pub fn today_completed(&self) -> u32 {
        self.stats.today_completed
    }

    pub fn current_streak(&self) -> u32 {
        self.stats.current_streak
    }

    /// True once today's completions meet the daily goal.
    pub fn goal_reached(&self) -> bool {
        self.stats.today_completed >= self.stats.daily_goal
    }

    /// Records one completed, non-skipped work session. Anything else is
    /// ignored so redundant host calls cannot distort the counts.
    pub fn add_completed_session(
        &mut self,
        db: &Database,
        session: &PomodoroSession,
        today: NaiveDate,
    ) {
        if !session.counts_toward_stats() {
            return;
        }
        self.rollover(today);

        self.stats.today_completed += 1;
        self.stats.weekly_completed[6] += 1;
        self.stats.total_completed += 1;

        // One completed day extends the streak; more sessions the same day
        // leave it alone; a gap restarts it at 1.
        let yesterday = today.pred_opt();
        self.stats.current_streak = match self.stats.last_completed_date {
            Some(date) if date == today => self.stats.current_streak,
            Some(date) if Some(date) == yesterday => self.stats.current_streak + 1,
            _ => 1,
        };
        self.stats.best_streak = self.stats.best_streak.max(self.stats.current_streak);
        self.stats.last_completed_date = Some(today);

        let first = *self.stats.first_session_date.get_or_insert(today);
        let days = (today - first).num_days().max(0) + 1;
        self.stats.average_per_day = f64::from(self.stats.total_completed) / days as f64;

        self.persist(db);
    }

    /// Sets the daily goal, clamped to its declared range.
    pub fn update_daily_goal(&mut self, db: &Database, goal: u32) {
        self.stats.daily_goal = goal.clamp(DAILY_GOAL_MIN, DAILY_GOAL_MAX);
        self.persist(db);
    }

    /// Unconditionally replaces the record with a zeroed default anchored
    /// to `today`. Asking the user first is the caller's concern.
    pub fn reset_stats(&mut self, db: &Database, today: NaiveDate) {
        self.stats = PomodoroStats::reset_for(today);
        self.persist(db);
    }

    /// Re-anchors the record when the calendar day has changed since the
    /// last access: the weekly window shifts left by the number of elapsed
    /// days (zero-filling) and today's count restarts. Runs at most once
    /// per day change. Returns whether anything moved.
    fn rollover(&mut self, today: NaiveDate) -> bool {
        let days = (today - self.stats.tracked_date).num_days();
        if days == 0 {
            return false;
        }
        if days < 0 {
            // Clock went backwards; re-anchor without losing the window.
            self.stats.tracked_date = today;
            return false;
        }
        let shift = days.min(7) as usize;
        self.stats.weekly_completed.rotate_left(shift);
        for slot in &mut self.stats.weekly_completed[7 - shift..] {
            *slot = 0;
        }
        self.stats.today_completed = 0;
        self.stats.tracked_date = today;
        true
    }

    fn persist(&self, db: &Database) {
        if let Err(e) = db.save_stats(&self.stats) {
            eprintln!("Failed to save stats: {e}");
        }
    }
}
