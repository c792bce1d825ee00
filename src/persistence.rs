//! SQLite persistence for settings, statistics, and session history.
//!
//! Each logical record is one JSON document in a key/value table. Records
//! are independently loadable and saveable; there is no cross-record
//! transaction.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{PomodoroSession, PomodoroStats};

/// Record key for persisted settings.
pub const SETTINGS_KEY: &str = "settings";
/// Record key for aggregate statistics.
pub const STATS_KEY: &str = "stats";
/// Record key for session history.
pub const SESSIONS_KEY: &str = "sessions";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to create database directory")]
    DirectoryCreation,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database at the platform data directory, initializing the
    /// schema if needed.
    pub fn new() -> Result<Self, DatabaseError> {
        Self::open(&Self::db_path())
    }

    /// Opens a database at an explicit path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| DatabaseError::DirectoryCreation)?;
        }
        let conn = Connection::open(path)?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing).
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_tables(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    fn db_path() -> PathBuf {
        ProjectDirs::from("com", "pomoterm", "Pomoterm")
            .map(|dirs| dirs.data_dir().join("pomoterm.db"))
            .unwrap_or_else(|| PathBuf::from("pomoterm.db"))
    }

    /// Loads and deserializes the record stored under `key`, or `None` when
    /// the record is absent.
    pub fn load_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DatabaseError> {
        let json: Option<String> = self
            .conn
            .query_row("SELECT value FROM records WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .ok();

        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    /// Serializes `value` and writes it under `key`, replacing any previous
    /// record.
    pub fn save_record<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO records (key, value) VALUES (?, ?)",
            params![key, json],
        )?;
        Ok(())
    }

    /// Raw settings JSON, if any. The settings store owns interpretation
    /// and clamping, so malformed JSON is surfaced as-is.
    pub fn load_settings_json(&self) -> Result<Option<serde_json::Value>, DatabaseError> {
        self.load_record(SETTINGS_KEY)
    }

    pub fn save_settings<T: Serialize>(&self, settings: &T) -> Result<(), DatabaseError> {
        self.save_record(SETTINGS_KEY, settings)
    }

    /// Loads persisted statistics, or a fresh default record.
    pub fn load_stats(&self) -> Result<PomodoroStats, DatabaseError> {
        Ok(self.load_record(STATS_KEY)?.unwrap_or_default())
    }

    pub fn save_stats(&self, stats: &PomodoroStats) -> Result<(), DatabaseError> {
        self.save_record(STATS_KEY, stats)
    }

    /// Loads the persisted session history, oldest first.
    pub fn load_sessions(&self) -> Result<Vec<PomodoroSession>, DatabaseError> {
        Ok(self.load_record(SESSIONS_KEY)?.unwrap_or_default())
    }

    pub fn save_sessions(&self, sessions: &[PomodoroSession]) -> Result<(), DatabaseError> {
        self.save_record(SESSIONS_KEY, &sessions)
    }
}
