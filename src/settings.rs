//! Validated user settings with write-through persistence.

use crate::models::{
    PomodoroSettings, LONG_BREAK_RANGE, SHORT_BREAK_RANGE, TICK_SOUND_RANGE, WORK_DURATION_RANGE,
};
use crate::notifications::Notifier;
use crate::persistence::Database;
use crate::utils::parse_duration_value;

/// Holds the authoritative in-memory settings. Every numeric field is kept
/// inside its declared range: persisted values are clamped on load and
/// updates are clamped before they are stored. Persistence failures are
/// logged and otherwise ignored - the in-memory state stays authoritative
/// and the next successful write reconciles.
pub struct SettingsStore {
    settings: PomodoroSettings,
}

impl SettingsStore {
    /// Loads settings from the database. An absent or malformed record
    /// yields the defaults; out-of-range fields are clamped. Never fails.
    pub fn load(db: &Database) -> Self {
        let settings = match db.load_settings_json() {
            Ok(Some(json)) => match serde_json::from_value::<PomodoroSettings>(json) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("Ignoring malformed settings record: {e}");
                    PomodoroSettings::default()
                }
            },
            Ok(None) => PomodoroSettings::default(),
            Err(e) => {
                eprintln!("Failed to load settings: {e}");
                PomodoroSettings::default()
            }
        };
        Self {
            settings: clamp(settings),
        }
    }

    pub fn get(&self) -> &PomodoroSettings {
        &self.settings
    }

    /// A copy for consumers that keep their own snapshot, like the engine.
    pub fn snapshot(&self) -> PomodoroSettings {
        self.settings.clone()
    }

    /// Applies an update, clamps the result, and persists it.
    pub fn update<F>(&mut self, db: &Database, updater: F)
    where
        F: FnOnce(&mut PomodoroSettings),
    {
        updater(&mut self.settings);
        self.settings = clamp(self.settings.clone());
        self.persist(db);
    }

    /// Restores the documented defaults and persists them.
    pub fn reset(&mut self, db: &Database) {
        self.settings = PomodoroSettings::default();
        self.persist(db);
    }

    /// Asks the notifier for permission and enables notifications only if
    /// it was granted. Returns whether notifications ended up enabled.
    pub fn enable_notifications(&mut self, db: &Database, notifier: &dyn Notifier) -> bool {
        if notifier.request_permission() {
            self.settings.notifications_enabled = true;
            self.persist(db);
            true
        } else {
            false
        }
    }

    fn persist(&self, db: &Database) {
        if let Err(e) = db.save_settings(&self.settings) {
            eprintln!("Failed to save settings: {e}");
        }
    }
}

/// Forces every numeric field into its declared range.
fn clamp(mut settings: PomodoroSettings) -> PomodoroSettings {
    settings.work_duration =
        parse_duration_value(f64::from(settings.work_duration), WORK_DURATION_RANGE);
    settings.short_break_duration =
        parse_duration_value(f64::from(settings.short_break_duration), SHORT_BREAK_RANGE);
    settings.long_break_duration =
        parse_duration_value(f64::from(settings.long_break_duration), LONG_BREAK_RANGE);
    settings.tick_sound_duration =
        parse_duration_value(f64::from(settings.tick_sound_duration), TICK_SOUND_RANGE);
    settings.sound_volume = settings.sound_volume.min(100);
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeNotifier {
        granted: bool,
        requests: Cell<u32>,
    }

    impl FakeNotifier {
        fn new(granted: bool) -> Self {
            Self {
                granted,
                requests: Cell::new(0),
            }
        }
    }

    impl Notifier for FakeNotifier {
        fn request_permission(&self) -> bool {
            self.requests.set(self.requests.get() + 1);
            self.granted
        }

        fn show(&self, _title: &str, _body: &str) {}
    }

    #[test]
    fn test_load_absent_returns_defaults() {
        let db = Database::new_in_memory().unwrap();
        let store = SettingsStore::load(&db);
        assert_eq!(store.get(), &PomodoroSettings::default());
    }

    #[test]
    fn test_load_clamps_out_of_range_values() {
        let db = Database::new_in_memory().unwrap();
        db.save_settings(&serde_json::json!({
            "workDuration": 7,
            "shortBreakDuration": 100,
            "longBreakDuration": 44,
            "soundVolume": 500,
            "tickSoundDuration": 0
        }))
        .unwrap();

        let store = SettingsStore::load(&db);
        assert_eq!(store.get().work_duration, 15);
        assert_eq!(store.get().short_break_duration, 15);
        assert_eq!(store.get().long_break_duration, 45);
        assert_eq!(store.get().sound_volume, 100);
        assert_eq!(store.get().tick_sound_duration, 5);
    }

    #[test]
    fn test_load_malformed_record_returns_defaults() {
        let db = Database::new_in_memory().unwrap();
        db.save_settings(&serde_json::json!({"workDuration": "not a number"}))
            .unwrap();

        let store = SettingsStore::load(&db);
        assert_eq!(store.get(), &PomodoroSettings::default());
    }

    #[test]
    fn test_load_missing_fields_get_defaults() {
        let db = Database::new_in_memory().unwrap();
        db.save_settings(&serde_json::json!({"workDuration": 30}))
            .unwrap();

        let store = SettingsStore::load(&db);
        assert_eq!(store.get().work_duration, 30);
        assert_eq!(store.get().short_break_duration, 5);
        assert!(store.get().notifications_enabled);
    }

    #[test]
    fn test_update_clamps_and_persists() {
        let db = Database::new_in_memory().unwrap();
        let mut store = SettingsStore::load(&db);

        store.update(&db, |s| {
            s.work_duration = 52; // off-step: rounds to 50
            s.sound_volume = 130;
            s.auto_start_breaks = true;
        });
        assert_eq!(store.get().work_duration, 50);
        assert_eq!(store.get().sound_volume, 100);
        assert!(store.get().auto_start_breaks);

        // Write-through: a fresh store sees the same values.
        let reloaded = SettingsStore::load(&db);
        assert_eq!(reloaded.get(), store.get());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let db = Database::new_in_memory().unwrap();
        let mut store = SettingsStore::load(&db);
        store.update(&db, |s| s.work_duration = 45);

        store.reset(&db);
        assert_eq!(store.get(), &PomodoroSettings::default());
        assert_eq!(SettingsStore::load(&db).get(), &PomodoroSettings::default());
    }

    #[test]
    fn test_enable_notifications_granted() {
        let db = Database::new_in_memory().unwrap();
        let mut store = SettingsStore::load(&db);
        store.update(&db, |s| s.notifications_enabled = false);

        let notifier = FakeNotifier::new(true);
        assert!(store.enable_notifications(&db, &notifier));
        assert!(store.get().notifications_enabled);
        assert_eq!(notifier.requests.get(), 1);
    }

    #[test]
    fn test_enable_notifications_denied_leaves_setting_off() {
        let db = Database::new_in_memory().unwrap();
        let mut store = SettingsStore::load(&db);
        store.update(&db, |s| s.notifications_enabled = false);

        let notifier = FakeNotifier::new(false);
        assert!(!store.enable_notifications(&db, &notifier));
        assert!(!store.get().notifications_enabled);
    }
}
