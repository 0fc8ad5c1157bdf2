use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, params};

use crate::models::{DailyEntry, UserProfile, validate_entry_date};

/// Fixed storage key for the JSON array of diary entries.
pub const ENTRIES_KEY: &str = "food-diary-entries";
/// Fixed storage key for the JSON profile object.
pub const PROFILE_KEY: &str = "food-diary-profile";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS records (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    fn put_record(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO records (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn get_record(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM records WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    // --- Entries ---

    /// All entries, in stored (date-ascending) order.
    pub fn entries(&self) -> Result<Vec<DailyEntry>> {
        match self.get_record(ENTRIES_KEY)? {
            Some(raw) => {
                serde_json::from_str(&raw).context("Failed to parse the stored entries record")
            }
            None => Ok(Vec::new()),
        }
    }

    /// Insert or replace the entry for its date, keeping the stored array
    /// sorted ascending by date key. The analysis is stripped before the
    /// write; the returned entry is the persisted payload.
    pub fn upsert_entry(&self, entry: &DailyEntry) -> Result<DailyEntry> {
        validate_entry_date(&entry.date)?;
        let stored = entry.without_analysis();

        let mut entries = self.entries()?;
        match entries.iter_mut().find(|e| e.date == stored.date) {
            Some(existing) => *existing = stored.clone(),
            None => entries.push(stored.clone()),
        }
        entries.sort_by(|a, b| a.date.cmp(&b.date));

        self.put_record(ENTRIES_KEY, &serde_json::to_string(&entries)?)?;
        Ok(stored)
    }

    /// The entry for `date`, if one was ever saved.
    pub fn entry(&self, date: &str) -> Result<Option<DailyEntry>> {
        Ok(self.entries()?.into_iter().find(|e| e.date == date))
    }

    /// Entries with `start <= date <= end` (ISO string comparison), in
    /// stored order.
    pub fn entries_between(&self, start: &str, end: &str) -> Result<Vec<DailyEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.date.as_str() >= start && e.date.as_str() <= end)
            .collect())
    }

    // --- Profile ---

    /// The stored profile, or an empty one when none was saved yet.
    pub fn profile(&self) -> Result<UserProfile> {
        match self.get_record(PROFILE_KEY)? {
            Some(raw) => {
                serde_json::from_str(&raw).context("Failed to parse the stored profile record")
            }
            None => Ok(UserProfile::default()),
        }
    }

    /// Overwrite the profile wholesale.
    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.put_record(PROFILE_KEY, &serde_json::to_string(profile)?)
    }
}
