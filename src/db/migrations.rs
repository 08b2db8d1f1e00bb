//! Database schema migration management and versioning.
//!
//! Every schema change is a numbered migration recorded in the `migrations`
//! table. Pending migrations run inside one transaction when a connection is
//! opened, so a database file is either fully at the latest version or left
//! untouched.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use weekplan::db::migrations::{init_with_migrations, get_db_version};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open("tasks.db")?;
//! init_with_migrations(&mut conn)?;
//! let version = get_db_version(&conn)?;
//! # Ok::<(), weekplan::libs::error::PlannerError>(())
//! ```

use crate::libs::error::PlannerResult;
use rusqlite::{params, Connection, Transaction};

/// SQL schema for the migrations tracking table.
const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// Default title of the bucket holding undated tasks.
pub const DEFAULT_INBOX_TITLE: &str = "📦 Inbox";

/// A single schema change.
#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> rusqlite::Result<()>,
}

/// Registry of all migrations in version order.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        // Version 1: task and settings tables plus the lookup indices
        self.add_migration(1, "create_tasks_and_settings", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        due_date DATE,
        completed INTEGER NOT NULL DEFAULT 0,
        task_order INTEGER NOT NULL DEFAULT 0,
        color TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        recurrence_rule TEXT NOT NULL DEFAULT '',
        recurrence_interval INTEGER NOT NULL DEFAULT 1
    )",
                [],
            )?;

            tx.execute(
                "CREATE TABLE IF NOT EXISTS settings (
        key TEXT NOT NULL PRIMARY KEY,
        value TEXT NOT NULL
    )",
                [],
            )?;

            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_title_duedate ON tasks(title, due_date)", [])?;
            // Day and range lookups
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date)", [])?;
            // Catch-up scan
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_recurring ON tasks(completed, recurrence_rule)", [])?;
            Ok(())
        });

        // Version 2: full-text index over title and description
        //
        // External-content FTS5 table kept in sync by triggers that fire in the
        // same transaction as the change to `tasks`.
        self.add_migration(2, "add_tasks_fts", |tx| {
            tx.execute(
                "CREATE VIRTUAL TABLE IF NOT EXISTS tasks_fts USING fts5(
                    title, description, content='tasks', content_rowid='id'
                )",
                [],
            )?;

            tx.execute_batch(
                "CREATE TRIGGER IF NOT EXISTS tasks_ai AFTER INSERT ON tasks BEGIN
                    INSERT INTO tasks_fts(rowid, title, description)
                    VALUES (new.id, new.title, new.description);
                END;
                CREATE TRIGGER IF NOT EXISTS tasks_ad AFTER DELETE ON tasks BEGIN
                    INSERT INTO tasks_fts(tasks_fts, rowid, title, description)
                    VALUES ('delete', old.id, old.title, old.description);
                END;
                CREATE TRIGGER IF NOT EXISTS tasks_au AFTER UPDATE OF title, description ON tasks BEGIN
                    INSERT INTO tasks_fts(tasks_fts, rowid, title, description)
                    VALUES ('delete', old.id, old.title, old.description);
                    INSERT INTO tasks_fts(rowid, title, description)
                    VALUES (new.id, new.title, new.description);
                END;",
            )?;

            // Index rows that predate the FTS table
            tx.execute("INSERT INTO tasks_fts(tasks_fts) VALUES ('rebuild')", [])?;
            Ok(())
        });

        // Version 3: default settings rows
        self.add_migration(3, "seed_default_settings", |tx| {
            tx.execute(
                "INSERT OR IGNORE INTO settings (key, value) VALUES ('inbox_title', ?1)",
                params![DEFAULT_INBOX_TITLE],
            )?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> rusqlite::Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Applies every migration newer than the current schema version.
    pub fn run_migrations(&self, conn: &mut Connection) -> PlannerResult<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        if pending.is_empty() {
            tracing::debug!(version = current_version, "database is up to date");
            return Ok(());
        }

        tracing::info!(count = pending.len(), "applying database migrations");
        let tx = conn.transaction()?;

        for migration in pending {
            tracing::info!(version = migration.version, name = migration.name, "running migration");
            if let Err(e) = (migration.up)(&tx) {
                tracing::error!(version = migration.version, error = %e, "migration failed");
                return Err(e.into());
            }
            tx.execute(
                "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                params![migration.version, migration.name],
            )?;
        }

        tx.commit()?;
        tracing::info!("all migrations completed");
        Ok(())
    }

    fn get_current_version(&self, conn: &Connection) -> PlannerResult<u32> {
        let version: Option<u32> = conn.query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0))?;
        Ok(version.unwrap_or(0))
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }

    pub fn is_migration_applied(&self, conn: &Connection, version: u32) -> PlannerResult<bool> {
        let count: i32 = conn.query_row("SELECT COUNT(*) FROM migrations WHERE version = ?1", params![version], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Applied migrations as `(version, name, applied_at)`, oldest first.
    pub fn get_migration_history(&self, conn: &Connection) -> PlannerResult<Vec<(u32, String, String)>> {
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;

        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(history)
    }
}

pub fn init_with_migrations(conn: &mut Connection) -> PlannerResult<()> {
    MigrationManager::new().run_migrations(conn)
}

/// Current schema version; 0 for a database that has never been migrated.
pub fn get_db_version(conn: &Connection) -> PlannerResult<u32> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'migrations'",
        [],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(0);
    }
    MigrationManager::new().get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> PlannerResult<bool> {
    let manager = MigrationManager::new();
    Ok(get_db_version(conn)? < manager.latest_version())
}
