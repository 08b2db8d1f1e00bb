use super::db::Db;
use super::migrations::DEFAULT_INBOX_TITLE;
use crate::libs::error::{PlannerError, PlannerResult};
use rusqlite::{params, OptionalExtension};

const INBOX_TITLE_KEY: &str = "inbox_title";
const SELECT_SETTING: &str = "SELECT value FROM settings WHERE key = ?1";
const INSERT_DEFAULT: &str = "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)";
const UPSERT_SETTING: &str = "INSERT INTO settings (key, value) VALUES (?1, ?2)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value";

/// Key/value application settings.
pub struct Settings {
    db: Db,
}

impl Settings {
    pub fn new(db: &Db) -> Self {
        Settings { db: db.clone() }
    }

    /// Title of the undated bucket, created with its default if missing.
    pub fn get_inbox_title(&self) -> PlannerResult<String> {
        let conn = self.db.conn();
        let title: Option<String> = conn.query_row(SELECT_SETTING, params![INBOX_TITLE_KEY], |row| row.get(0)).optional()?;

        match title {
            Some(title) => Ok(title),
            None => {
                conn.execute(INSERT_DEFAULT, params![INBOX_TITLE_KEY, DEFAULT_INBOX_TITLE])?;
                tracing::info!("default inbox title restored");
                Ok(DEFAULT_INBOX_TITLE.to_string())
            }
        }
    }

    pub fn update_inbox_title(&self, title: &str) -> PlannerResult<()> {
        if title.trim().is_empty() {
            return Err(PlannerError::validation("Invalid inbox title"));
        }
        let conn = self.db.conn();
        conn.execute(UPSERT_SETTING, params![INBOX_TITLE_KEY, title])?;
        tracing::debug!(title, "inbox title updated");

        Ok(())
    }
}
