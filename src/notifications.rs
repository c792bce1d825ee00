//! Desktop notifications for timer events.
//!
//! Notifications are fire-and-forget: they run on a background thread,
//! auto-dismiss after a fixed interval, and failures are logged rather
//! than surfaced to the timer loop.

use std::thread;

use notify_rust::Notification;

use crate::models::SessionType;

/// How long a notification stays on screen before auto-dismissing.
const DISMISS_AFTER_MS: u32 = 5_000;

/// Narrow seam over the platform notification service, so the settings
/// store and tests can run against a fake.
pub trait Notifier {
    /// Asks for permission to show notifications. Returns whether it was
    /// granted.
    fn request_permission(&self) -> bool;

    /// Shows a notification. Must never panic or block the caller.
    fn show(&self, title: &str, body: &str);
}

/// Notifier backed by the system notification service.
pub struct SystemNotifier;

impl Notifier for SystemNotifier {
    fn request_permission(&self) -> bool {
        // Freedesktop servers advertise capabilities; reaching the server
        // is the permission that matters there. Other platforms prompt on
        // first delivery, so there is nothing to ask up front.
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            notify_rust::get_capabilities().is_ok()
        }
        #[cfg(not(all(unix, not(target_os = "macos"))))]
        {
            true
        }
    }

    fn show(&self, title: &str, body: &str) {
        let title = title.to_owned();
        let body = body.to_owned();
        thread::spawn(move || {
            if let Err(e) = Notification::new()
                .summary(&title)
                .body(&body)
                .timeout(notify_rust::Timeout::Milliseconds(DISMISS_AFTER_MS))
                .show()
            {
                eprintln!("Failed to show notification: {e}");
            }
        });
    }
}

/// Builds the notification copy for a finished session.
///
/// Work completions celebrate today's count; finished breaks nudge the
/// user back to work.
pub fn session_complete_message(
    finished: SessionType,
    next: SessionType,
    completed_today: u32,
) -> (String, String) {
    match finished {
        SessionType::Work => {
            let count = if completed_today == 1 {
                "1 pomodoro".to_string()
            } else {
                format!("{completed_today} pomodoros")
            };
            let title = "Pomodoro Complete!".to_string();
            let body = format!(
                "Great work! You've completed {count} today.\nTime for a {}.",
                next.display_name().to_lowercase()
            );
            (title, body)
        }
        SessionType::ShortBreak | SessionType::LongBreak => (
            "Break Over!".to_string(),
            "Ready to start another pomodoro?".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_message_singular() {
        let (title, body) =
            session_complete_message(SessionType::Work, SessionType::ShortBreak, 1);
        assert_eq!(title, "Pomodoro Complete!");
        assert!(body.contains("1 pomodoro today"));
        assert!(body.contains("short break"));
    }

    #[test]
    fn test_work_message_plural_long_break() {
        let (_, body) = session_complete_message(SessionType::Work, SessionType::LongBreak, 4);
        assert!(body.contains("4 pomodoros today"));
        assert!(body.contains("long break"));
    }

    #[test]
    fn test_break_message() {
        let (title, body) =
            session_complete_message(SessionType::ShortBreak, SessionType::Work, 2);
        assert_eq!(title, "Break Over!");
        assert!(body.contains("another pomodoro"));

        let (title, _) = session_complete_message(SessionType::LongBreak, SessionType::Work, 4);
        assert_eq!(title, "Break Over!");
    }
}
