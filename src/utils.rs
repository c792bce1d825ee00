//! Pure helper functions shared by the engine, settings, and stats.

use crate::models::{SettingRange, SessionType};

/// Completed work sessions between long breaks.
pub const LONG_BREAK_INTERVAL: u32 = 4;

/// Formats whole seconds as MM:SS.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Normalizes a raw duration value against a setting range.
///
/// Non-finite input yields the range minimum. Anything else is rounded to
/// the nearest step multiple and clamped into `[min, max]`. Applying this
/// twice gives the same result as applying it once.
pub fn parse_duration_value(raw: f64, range: SettingRange) -> u32 {
    if !raw.is_finite() {
        return range.min;
    }
    let step = range.step.max(1) as f64;
    let stepped = (raw / step).round() * step;
    stepped.clamp(range.min as f64, range.max as f64) as u32
}

/// Chooses the session type that follows `current`.
///
/// After a work session the counter decides: every `LONG_BREAK_INTERVAL`th
/// completion earns a long break, anything else a short one. Either break
/// is always followed by work. Callers pass the post-increment counter for
/// completions and the unchanged counter for skips.
pub fn next_session_type(current: SessionType, completed_pomodoros: u32) -> SessionType {
    match current {
        SessionType::Work => {
            if completed_pomodoros > 0 && completed_pomodoros % LONG_BREAK_INTERVAL == 0 {
                SessionType::LongBreak
            } else {
                SessionType::ShortBreak
            }
        }
        SessionType::ShortBreak | SessionType::LongBreak => SessionType::Work,
    }
}

/// Display tier for the current streak length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakIntensity {
    Low,
    Medium,
    High,
    Blazing,
}

/// Classifies a streak at the fixed 5 / 10 / 20 day thresholds.
pub fn streak_intensity(streak: u32) -> StreakIntensity {
    match streak {
        s if s >= 20 => StreakIntensity::Blazing,
        s if s >= 10 => StreakIntensity::High,
        s if s >= 5 => StreakIntensity::Medium,
        _ => StreakIntensity::Low,
    }
}

/// True for hours that fall in the night window (22:00-06:00).
/// Takes the hour as an argument so callers control the clock.
pub fn should_use_night_mode(hour: u32) -> bool {
    hour >= 22 || hour < 6
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        LONG_BREAK_RANGE, SHORT_BREAK_RANGE, TICK_SOUND_RANGE, WORK_DURATION_RANGE,
    };
    use proptest::prelude::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(60), "01:00");
        assert_eq!(format_time(125), "02:05");
        assert_eq!(format_time(1500), "25:00");
        assert_eq!(format_time(3599), "59:59");
    }

    #[test]
    fn test_parse_duration_rounds_to_step() {
        assert_eq!(parse_duration_value(23.0, WORK_DURATION_RANGE), 25);
        assert_eq!(parse_duration_value(22.0, WORK_DURATION_RANGE), 20);
        assert_eq!(parse_duration_value(25.0, WORK_DURATION_RANGE), 25);
        assert_eq!(parse_duration_value(7.4, SHORT_BREAK_RANGE), 7);
    }

    #[test]
    fn test_parse_duration_clamps() {
        assert_eq!(parse_duration_value(5.0, WORK_DURATION_RANGE), 15);
        assert_eq!(parse_duration_value(500.0, WORK_DURATION_RANGE), 60);
        assert_eq!(parse_duration_value(-3.0, SHORT_BREAK_RANGE), 3);
        assert_eq!(parse_duration_value(90.0, LONG_BREAK_RANGE), 45);
    }

    #[test]
    fn test_parse_duration_invalid_yields_min() {
        assert_eq!(parse_duration_value(f64::NAN, WORK_DURATION_RANGE), 15);
        assert_eq!(parse_duration_value(f64::INFINITY, SHORT_BREAK_RANGE), 3);
        assert_eq!(parse_duration_value(f64::NEG_INFINITY, LONG_BREAK_RANGE), 15);
    }

    #[test]
    fn test_next_type_after_work() {
        assert_eq!(next_session_type(SessionType::Work, 0), SessionType::ShortBreak);
        assert_eq!(next_session_type(SessionType::Work, 1), SessionType::ShortBreak);
        assert_eq!(next_session_type(SessionType::Work, 3), SessionType::ShortBreak);
        assert_eq!(next_session_type(SessionType::Work, 4), SessionType::LongBreak);
        assert_eq!(next_session_type(SessionType::Work, 5), SessionType::ShortBreak);
        assert_eq!(next_session_type(SessionType::Work, 8), SessionType::LongBreak);
    }

    #[test]
    fn test_next_type_after_breaks() {
        assert_eq!(next_session_type(SessionType::ShortBreak, 0), SessionType::Work);
        assert_eq!(next_session_type(SessionType::ShortBreak, 4), SessionType::Work);
        assert_eq!(next_session_type(SessionType::LongBreak, 4), SessionType::Work);
    }

    #[test]
    fn test_streak_intensity_thresholds() {
        assert_eq!(streak_intensity(0), StreakIntensity::Low);
        assert_eq!(streak_intensity(4), StreakIntensity::Low);
        assert_eq!(streak_intensity(5), StreakIntensity::Medium);
        assert_eq!(streak_intensity(9), StreakIntensity::Medium);
        assert_eq!(streak_intensity(10), StreakIntensity::High);
        assert_eq!(streak_intensity(19), StreakIntensity::High);
        assert_eq!(streak_intensity(20), StreakIntensity::Blazing);
        assert_eq!(streak_intensity(100), StreakIntensity::Blazing);
    }

    #[test]
    fn test_night_mode_window() {
        assert!(should_use_night_mode(22));
        assert!(should_use_night_mode(23));
        assert!(should_use_night_mode(0));
        assert!(should_use_night_mode(5));
        assert!(!should_use_night_mode(6));
        assert!(!should_use_night_mode(12));
        assert!(!should_use_night_mode(21));
    }

    proptest! {
        #[test]
        fn parse_duration_is_idempotent(raw in -1000.0f64..1000.0) {
            for range in [
                WORK_DURATION_RANGE,
                SHORT_BREAK_RANGE,
                LONG_BREAK_RANGE,
                TICK_SOUND_RANGE,
            ] {
                let once = parse_duration_value(raw, range);
                let twice = parse_duration_value(once as f64, range);
                prop_assert_eq!(once, twice);
                prop_assert!(once >= range.min && once <= range.max);
            }
        }
    }
}
