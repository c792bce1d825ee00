//! Main application state and coordination.
//!
//! `App` wires the engine to the settings store, the stats aggregator, and
//! the database. It is the boundary where wall-clock dates enter: the
//! engine and the aggregator themselves only see explicit instants and
//! days.

use std::time::Instant;

use chrono::Local;
use thiserror::Error;

use crate::engine::TimerEngine;
use crate::models::{PomodoroSession, PomodoroSettings, SessionType};
use crate::notifications::Notifier;
use crate::persistence::{Database, DatabaseError};
use crate::settings::SettingsStore;
use crate::stats::StatsAggregator;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Handed to the host exactly once per naturally completed session.
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    pub session: PomodoroSession,
    /// The session type staged (or auto-started) next.
    pub next_type: SessionType,
    pub completed_today: u32,
    pub goal_reached: bool,
}

/// Result of one host tick.
#[derive(Debug, Default)]
pub struct AppTick {
    /// The visible state moved; the host should redraw.
    pub changed: bool,
    pub completion: Option<CompletionEvent>,
    /// The host should play one tick blip.
    pub play_tick: bool,
}

pub struct App {
    pub engine: TimerEngine,
    pub settings: SettingsStore,
    pub stats: StatsAggregator,
    db: Database,
}

impl App {
    /// Creates the application, restoring settings, statistics, and
    /// today's session history from the database.
    pub fn new() -> Result<Self, AppError> {
        Self::with_db(Database::new()?)
    }

    /// Creates an app over an explicit database (for testing).
    #[cfg(test)]
    pub fn new_with_db(db: Database) -> Result<Self, AppError> {
        Self::with_db(db)
    }

    fn with_db(db: Database) -> Result<Self, AppError> {
        let today = Local::now().date_naive();
        let settings = SettingsStore::load(&db);
        let sessions = db.load_sessions().unwrap_or_else(|e| {
            eprintln!("Ignoring unreadable session history: {e}");
            Vec::new()
        });
        let engine = TimerEngine::with_history(settings.snapshot(), sessions, today);
        let stats = StatsAggregator::load(&db, today);

        Ok(Self {
            engine,
            settings,
            stats,
            db,
        })
    }

    pub fn start(&mut self, now: Instant) {
        self.engine.start(now);
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Skips the current session. Skipped sessions join the persisted
    /// history but never touch the statistics.
    pub fn skip(&mut self) -> Option<PomodoroSession> {
        let session = self.engine.skip()?;
        self.persist_sessions();
        Some(session)
    }

    /// Advances the engine and routes a completion, if any: history is
    /// persisted, completed work sessions feed the aggregator, and the
    /// host gets one `CompletionEvent`.
    pub fn tick(&mut self, now: Instant) -> AppTick {
        let tick = self.engine.tick(now);

        let completion = tick.completed.map(|session| {
            if session.counts_toward_stats() {
                let today = Local::now().date_naive();
                self.stats.add_completed_session(&self.db, &session, today);
            }
            self.persist_sessions();
            CompletionEvent {
                next_type: self.engine.session_type(),
                completed_today: self.stats.today_completed(),
                goal_reached: self.stats.goal_reached(),
                session,
            }
        });

        let settings = self.settings.get();
        let play_tick = settings.tick_sound_enabled
            && tick.seconds_elapsed > 0
            && self.engine.state().is_running()
            && self.engine.time_remaining() > 0
            && self.engine.time_remaining() <= settings.tick_sound_duration;

        AppTick {
            changed: tick.seconds_elapsed > 0 || completion.is_some(),
            completion,
            play_tick,
        }
    }

    /// Applies a settings update and hands the engine a fresh snapshot for
    /// future sessions.
    pub fn update_settings<F>(&mut self, updater: F)
    where
        F: FnOnce(&mut PomodoroSettings),
    {
        self.settings.update(&self.db, updater);
        self.engine.set_settings(self.settings.snapshot());
    }

    /// Restores default settings.
    pub fn reset_settings(&mut self) {
        self.settings.reset(&self.db);
        self.engine.set_settings(self.settings.snapshot());
    }

    pub fn enable_notifications(&mut self, notifier: &dyn Notifier) -> bool {
        self.settings.enable_notifications(&self.db, notifier)
    }

    pub fn update_daily_goal(&mut self, goal: u32) {
        self.stats.update_daily_goal(&self.db, goal);
    }

    /// Wipes the statistics record. The host asks the user first.
    pub fn reset_stats(&mut self) {
        self.stats.reset_stats(&self.db, Local::now().date_naive());
    }

    fn persist_sessions(&self) {
        if let Err(e) = self.db.save_sessions(self.engine.sessions()) {
            eprintln!("Failed to save session history: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimerState;
    use std::time::Duration;

    fn create_test_app() -> App {
        let db = Database::new_in_memory().unwrap();
        App::new_with_db(db).unwrap()
    }

    /// Swaps in raw (unclamped) short durations to keep tests fast.
    fn shorten(app: &mut App) {
        app.engine.set_settings(PomodoroSettings {
            work_duration: 1,
            short_break_duration: 1,
            ..PomodoroSettings::default()
        });
    }

    fn complete_one(app: &mut App, mut now: Instant) -> (CompletionEvent, Instant) {
        app.start(now);
        for _ in 0..app.engine.session_total() + 1 {
            now += Duration::from_secs(1);
            if let Some(ev) = app.tick(now).completion {
                return (ev, now);
            }
        }
        panic!("no completion");
    }

    #[test]
    fn test_initial_state() {
        let app = create_test_app();
        assert_eq!(app.engine.state(), TimerState::Idle);
        assert_eq!(app.settings.get(), &PomodoroSettings::default());
        assert_eq!(app.stats.today_completed(), 0);
    }

    #[test]
    fn test_completion_reaches_stats_and_host() {
        let mut app = create_test_app();
        shorten(&mut app);

        let (ev, _) = complete_one(&mut app, Instant::now());
        assert_eq!(ev.session.session_type, SessionType::Work);
        assert!(!ev.session.was_skipped);
        assert_eq!(ev.next_type, SessionType::ShortBreak);
        assert_eq!(ev.completed_today, 1);
        assert_eq!(app.stats.today_completed(), 1);
        assert_eq!(app.engine.completed_pomodoros(), 1);
    }

    #[test]
    fn test_break_completion_skips_stats() {
        let mut app = create_test_app();
        shorten(&mut app);

        let (_, now) = complete_one(&mut app, Instant::now());
        let (ev, _) = complete_one(&mut app, now);

        assert_eq!(ev.session.session_type, SessionType::ShortBreak);
        assert_eq!(ev.next_type, SessionType::Work);
        // Only the work session counted.
        assert_eq!(app.stats.today_completed(), 1);
    }

    #[test]
    fn test_skip_bypasses_stats_but_persists_history() {
        let mut app = create_test_app();
        app.start(Instant::now());

        let skipped = app.skip().expect("skipped session");
        assert!(skipped.was_skipped);
        assert_eq!(app.stats.today_completed(), 0);
        assert_eq!(app.engine.total_pomodoros(), 0);
        assert_eq!(app.db.load_sessions().unwrap().len(), 1);
    }

    #[test]
    fn test_tick_flags() {
        let t0 = Instant::now();
        let mut app = create_test_app();

        // Idle: nothing moves.
        let tick = app.tick(t0);
        assert!(!tick.changed);
        assert!(tick.completion.is_none());

        app.start(t0);
        let tick = app.tick(t0 + Duration::from_secs(1));
        assert!(tick.changed);
        assert!(tick.completion.is_none());

        app.pause();
        let tick = app.tick(t0 + Duration::from_secs(5));
        assert!(!tick.changed);
    }

    #[test]
    fn test_tick_sound_window() {
        let t0 = Instant::now();
        let mut app = create_test_app();
        app.update_settings(|s| {
            s.tick_sound_enabled = true;
            s.tick_sound_duration = 10;
        });
        app.engine.set_settings(PomodoroSettings {
            work_duration: 1,
            tick_sound_enabled: true,
            ..PomodoroSettings::default()
        });

        app.start(t0);
        // 45 seconds in: 15 remaining, outside the 10-second window.
        let tick = app.tick(t0 + Duration::from_secs(45));
        assert!(!tick.play_tick);
        // 52 seconds in: 8 remaining, inside the window.
        let tick = app.tick(t0 + Duration::from_secs(52));
        assert!(tick.play_tick);
        // Unchanged clock: no second blip.
        let tick = app.tick(t0 + Duration::from_secs(52));
        assert!(!tick.play_tick);
    }

    #[test]
    fn test_settings_update_clamps_and_reaches_engine() {
        let mut app = create_test_app();
        app.update_settings(|s| s.work_duration = 52);

        assert_eq!(app.settings.get().work_duration, 50);
        assert_eq!(app.engine.time_remaining(), 50 * 60);
    }

    #[test]
    fn test_restart_restores_history_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pomoterm.db");

        {
            let mut app = App::new_with_db(Database::open(&path).unwrap()).unwrap();
            shorten(&mut app);
            complete_one(&mut app, Instant::now());
            assert_eq!(app.engine.total_pomodoros(), 1);
        }

        let app = App::new_with_db(Database::open(&path).unwrap()).unwrap();
        assert_eq!(app.engine.total_pomodoros(), 1);
        assert_eq!(app.engine.sessions().len(), 1);
        assert_eq!(app.stats.today_completed(), 1);
        // The cycle restarts on a fresh run.
        assert_eq!(app.engine.completed_pomodoros(), 0);
    }

    #[test]
    fn test_goal_reached_flag_on_event() {
        let mut app = create_test_app();
        shorten(&mut app);
        app.update_daily_goal(1);

        let (ev, _) = complete_one(&mut app, Instant::now());
        assert!(ev.goal_reached);
    }
}
