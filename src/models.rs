//! Data models for the pomoterm timer core.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive range with a step size for a numeric setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

/// Work session length in minutes.
pub const WORK_DURATION_RANGE: SettingRange = SettingRange {
    min: 15,
    max: 60,
    step: 5,
};
/// Short break length in minutes.
pub const SHORT_BREAK_RANGE: SettingRange = SettingRange {
    min: 3,
    max: 15,
    step: 1,
};
/// Long break length in minutes.
pub const LONG_BREAK_RANGE: SettingRange = SettingRange {
    min: 15,
    max: 45,
    step: 5,
};
/// Seconds of ticking before the end of a session.
pub const TICK_SOUND_RANGE: SettingRange = SettingRange {
    min: 5,
    max: 60,
    step: 5,
};

/// Daily goal bounds, in completed work sessions per day.
pub const DAILY_GOAL_MIN: u32 = 1;
pub const DAILY_GOAL_MAX: u32 = 20;

/// The kind of interval a session covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    /// Human-readable name for status lines and notifications.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Work => "Focus",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    /// Accent color associated with the session type.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Work => "#ef4444",
            Self::ShortBreak => "#22c55e",
            Self::LongBreak => "#3b82f6",
        }
    }

    /// Returns true for either break variant.
    pub fn is_break(&self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }
}

/// Timer state machine states. The session type of the current or pending
/// session carries the rest of the picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
}

impl TimerState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }
}

/// One timed interval of work or break.
///
/// Created when the engine transitions into `Running` from `Idle`, and
/// finalized exactly once: either completed on natural expiry or skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSession {
    pub id: u64,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub start_time: DateTime<Local>,
    #[serde(default)]
    pub end_time: Option<DateTime<Local>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub was_skipped: bool,
}

impl PomodoroSession {
    /// Returns true once the session has been completed or skipped.
    pub fn is_finalized(&self) -> bool {
        self.end_time.is_some()
    }

    /// Returns true for a work session that ran to completion. Only these
    /// count toward daily statistics.
    pub fn counts_toward_stats(&self) -> bool {
        self.session_type == SessionType::Work
            && !self.was_skipped
            && self.completed_at.is_some()
    }
}

/// User-configurable durations and behavior flags.
///
/// Every numeric field is kept within its declared range by the settings
/// store; out-of-range persisted values are clamped on load, never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSettings {
    /// Work session length in minutes.
    #[serde(default = "default_work_duration")]
    pub work_duration: u32,
    /// Short break length in minutes.
    #[serde(default = "default_short_break")]
    pub short_break_duration: u32,
    /// Long break length in minutes.
    #[serde(default = "default_long_break")]
    pub long_break_duration: u32,
    /// Start the next break without waiting for the user.
    #[serde(default)]
    pub auto_start_breaks: bool,
    /// Start the next work session without waiting for the user.
    #[serde(default)]
    pub auto_start_pomodoros: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    /// Playback volume, 0-100.
    #[serde(default = "default_volume")]
    pub sound_volume: u32,
    #[serde(default)]
    pub tick_sound_enabled: bool,
    /// Seconds of ticking before the end of a running session.
    #[serde(default = "default_tick_duration")]
    pub tick_sound_duration: u32,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

fn default_work_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_volume() -> u32 {
    50
}
fn default_tick_duration() -> u32 {
    10
}
fn default_true() -> bool {
    true
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            short_break_duration: default_short_break(),
            long_break_duration: default_long_break(),
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            sound_enabled: true,
            sound_volume: default_volume(),
            tick_sound_enabled: false,
            tick_sound_duration: default_tick_duration(),
            notifications_enabled: true,
        }
    }
}

impl PomodoroSettings {
    /// Configured length in minutes for the given session type.
    pub fn duration_mins(&self, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Work => self.work_duration,
            SessionType::ShortBreak => self.short_break_duration,
            SessionType::LongBreak => self.long_break_duration,
        }
    }
}

/// Aggregate statistics, persisted separately from session history and
/// mutated only by the stats aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroStats {
    /// Target completed work sessions per day, 1-20.
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    #[serde(default)]
    pub today_completed: u32,
    /// Completions for the last seven days, oldest first; index 6 is today.
    #[serde(default)]
    pub weekly_completed: [u32; 7],
    #[serde(default)]
    pub total_completed: u32,
    /// Consecutive calendar days with at least one completed work session.
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub last_completed_date: Option<NaiveDate>,
    /// First day a work session was ever recorded; anchors the average.
    #[serde(default)]
    pub first_session_date: Option<NaiveDate>,
    /// The day the weekly window and `today_completed` are aligned to.
    #[serde(default = "today")]
    pub tracked_date: NaiveDate,
    /// Informational only: total completed over days since the first session.
    #[serde(default)]
    pub average_per_day: f64,
}

fn default_daily_goal() -> u32 {
    8
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl Default for PomodoroStats {
    fn default() -> Self {
        Self {
            daily_goal: default_daily_goal(),
            today_completed: 0,
            weekly_completed: [0; 7],
            total_completed: 0,
            current_streak: 0,
            best_streak: 0,
            last_completed_date: None,
            first_session_date: None,
            tracked_date: today(),
            average_per_day: 0.0,
        }
    }
}

impl PomodoroStats {
    /// A zeroed default record anchored to the given day.
    pub fn reset_for(day: NaiveDate) -> Self {
        Self {
            tracked_date: day,
            ..Self::default()
        }
    }
}
