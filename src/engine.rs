//! The Pomodoro session state machine.
//!
//! The engine owns the current session, the remaining time, and the session
//! history. It never spawns threads, performs I/O, or blocks - the host
//! drives it by calling [`TimerEngine::tick`] on its own schedule and routes
//! the finalized sessions the engine hands back.
//!
//! Time is accounted against real elapsed wall-clock deltas: `tick`
//! accumulates milliseconds across calls and deducts only whole seconds,
//! carrying the remainder forward. A jittery caller therefore cannot make
//! the timer run fast or slow.

use std::time::Instant;

use chrono::{Local, NaiveDate};

use crate::models::{PomodoroSession, PomodoroSettings, SessionType, TimerState};
use crate::utils::next_session_type;

/// Outcome of a single [`TimerEngine::tick`] call.
#[derive(Debug, Default)]
pub struct Tick {
    /// Whole seconds deducted from the remaining time by this call.
    pub seconds_elapsed: u32,
    /// The finalized session, present exactly once per natural completion.
    pub completed: Option<PomodoroSession>,
}

pub struct TimerEngine {
    settings: PomodoroSettings,
    state: TimerState,
    current: Option<PomodoroSession>,
    /// Session type the next `start` will materialize.
    pending_type: SessionType,
    /// Whole seconds left in the current or staged session.
    time_remaining: u32,
    /// Full length in seconds of the current or staged session.
    session_total: u32,
    /// Completed work sessions since the last finished long break.
    completed_pomodoros: u32,
    /// Completed work sessions today.
    total_pomodoros: u32,
    /// Finalized sessions, in insertion order.
    sessions: Vec<PomodoroSession>,
    /// Baseline for elapsed-time measurement while running.
    last_tick: Option<Instant>,
    /// Sub-second milliseconds carried between ticks.
    carry_ms: u64,
    next_id: u64,
}

impl TimerEngine {
    pub fn new(settings: PomodoroSettings) -> Self {
        let total = settings.duration_mins(SessionType::Work) * 60;
        Self {
            settings,
            state: TimerState::Idle,
            current: None,
            pending_type: SessionType::Work,
            time_remaining: total,
            session_total: total,
            completed_pomodoros: 0,
            total_pomodoros: 0,
            sessions: Vec::new(),
            last_tick: None,
            carry_ms: 0,
            next_id: 1,
        }
    }

    /// Rebuilds an engine from persisted session history.
    ///
    /// Today's completed work sessions are counted back into
    /// `total_pomodoros`; the long-break cycle restarts from zero, as it
    /// does in a fresh engine.
    pub fn with_history(
        settings: PomodoroSettings,
        sessions: Vec<PomodoroSession>,
        today: NaiveDate,
    ) -> Self {
        let mut engine = Self::new(settings);
        engine.total_pomodoros = sessions
            .iter()
            .filter(|s| s.counts_toward_stats() && s.start_time.date_naive() == today)
            .count() as u32;
        engine.next_id = sessions.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        engine.sessions = sessions;
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn current_session(&self) -> Option<&PomodoroSession> {
        self.current.as_ref()
    }

    /// The type of the current session, or of the one the next `start`
    /// would create.
    pub fn session_type(&self) -> SessionType {
        self.current
            .as_ref()
            .map(|s| s.session_type)
            .unwrap_or(self.pending_type)
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn session_total(&self) -> u32 {
        self.session_total
    }

    pub fn completed_pomodoros(&self) -> u32 {
        self.completed_pomodoros
    }

    pub fn total_pomodoros(&self) -> u32 {
        self.total_pomodoros
    }

    pub fn sessions(&self) -> &[PomodoroSession] {
        &self.sessions
    }

    pub fn settings(&self) -> &PomodoroSettings {
        &self.settings
    }

    /// Percentage of the current session already elapsed, 0-100.
    /// Zero when no session is active.
    pub fn progress(&self) -> f64 {
        if self.current.is_none() || self.session_total == 0 {
            return 0.0;
        }
        let elapsed = self.session_total - self.time_remaining;
        f64::from(elapsed) / f64::from(self.session_total) * 100.0
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replaces the settings snapshot used for future sessions. A session
    /// already in flight keeps the duration it started with.
    pub fn set_settings(&mut self, settings: PomodoroSettings) {
        self.settings = settings;
        if self.state.is_idle() && self.current.is_none() {
            self.stage(self.pending_type);
        }
    }

    /// Starts the pending session, or resumes a paused one.
    pub fn start(&mut self, now: Instant) {
        match self.state {
            TimerState::Running => {}
            TimerState::Paused => {
                self.state = TimerState::Running;
                self.last_tick = Some(now);
            }
            TimerState::Idle => {
                self.stage(self.pending_type);
                self.current = Some(PomodoroSession {
                    id: self.take_id(),
                    session_type: self.pending_type,
                    start_time: Local::now(),
                    end_time: None,
                    completed_at: None,
                    was_skipped: false,
                });
                self.state = TimerState::Running;
                self.last_tick = Some(now);
                self.carry_ms = 0;
            }
        }
    }

    /// Suspends the countdown. Remaining time and session identity are
    /// untouched.
    pub fn pause(&mut self) {
        if self.state.is_running() {
            self.state = TimerState::Paused;
            self.last_tick = None;
        }
    }

    /// Discards the current session without finalizing it and restores the
    /// full configured duration for its type.
    pub fn reset(&mut self) {
        if let Some(session) = self.current.take() {
            self.pending_type = session.session_type;
        }
        self.state = TimerState::Idle;
        self.last_tick = None;
        self.carry_ms = 0;
        self.stage(self.pending_type);
    }

    /// Finalizes the current session as skipped and stages the next type
    /// without starting it. No-op when there is no session.
    pub fn skip(&mut self) -> Option<PomodoroSession> {
        let mut session = self.current.take()?;
        session.was_skipped = true;
        session.end_time = Some(Local::now());
        self.sessions.push(session.clone());

        // Skips do not count as completions, so the cadence check sees the
        // unchanged counter.
        let next = next_session_type(session.session_type, self.completed_pomodoros);
        self.pending_type = next;
        self.state = TimerState::Idle;
        self.last_tick = None;
        self.carry_ms = 0;
        self.stage(next);
        Some(session)
    }

    /// Advances the countdown by the wall-clock time elapsed since the
    /// previous tick. No-op unless running.
    pub fn tick(&mut self, now: Instant) -> Tick {
        if !self.state.is_running() {
            return Tick::default();
        }
        let Some(last) = self.last_tick.replace(now) else {
            return Tick::default();
        };

        self.carry_ms += now.saturating_duration_since(last).as_millis() as u64;
        let whole = (self.carry_ms / 1000) as u32;
        self.carry_ms %= 1000;
        if whole == 0 {
            return Tick::default();
        }

        let previous = self.time_remaining;
        self.time_remaining = previous.saturating_sub(whole);

        let completed = if previous > 0 && self.time_remaining == 0 {
            self.finish_session(now)
        } else {
            None
        };

        Tick {
            seconds_elapsed: whole,
            completed,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Finalizes the expired session, updates the counters, and stages or
    /// auto-starts the next one. Returns the finalized session.
    fn finish_session(&mut self, now: Instant) -> Option<PomodoroSession> {
        let mut session = self.current.take()?;
        let finished_at = Local::now();
        session.completed_at = Some(finished_at);
        session.end_time = Some(finished_at);
        self.sessions.push(session.clone());

        if session.session_type == SessionType::Work {
            self.completed_pomodoros += 1;
            self.total_pomodoros += 1;
        }

        // The long break's own trigger counts toward the threshold that
        // caused it; the cycle restarts only after the break finishes.
        let next = next_session_type(session.session_type, self.completed_pomodoros);
        if session.session_type == SessionType::LongBreak {
            self.completed_pomodoros = 0;
        }
        self.pending_type = next;
        self.stage(next);

        let auto_start = match next {
            SessionType::Work => self.settings.auto_start_pomodoros,
            SessionType::ShortBreak | SessionType::LongBreak => self.settings.auto_start_breaks,
        };
        if auto_start {
            self.current = Some(PomodoroSession {
                id: self.take_id(),
                session_type: next,
                start_time: finished_at,
                end_time: None,
                completed_at: None,
                was_skipped: false,
            });
            self.last_tick = Some(now);
            self.carry_ms = 0;
        } else {
            self.state = TimerState::Idle;
            self.last_tick = None;
            self.carry_ms = 0;
        }

        Some(session)
    }

    /// Loads the full configured duration for `session_type` into the
    /// remaining-time fields.
    fn stage(&mut self, session_type: SessionType) {
        let total = self.settings.duration_mins(session_type) * 60;
        self.session_total = total;
        self.time_remaining = total;
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
