//! Storage handle shared by every repository and engine.
//!
//! A [`Db`] is constructed once by the process and passed explicitly to the
//! components that need storage. Cloning it is cheap: all clones share one
//! SQLite connection behind a mutex, which is also what makes swapping the
//! database file during an import atomic for every other caller.

use super::migrations::init_with_migrations;
use crate::libs::config::Config;
use crate::libs::data_storage::DataStorage;
use crate::libs::error::{PlannerError, PlannerResult};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DB_FILE_NAME: &str = "tasks.db";
const BACKUP_SUFFIX: &str = "bak";
const IMPORT_SUFFIX: &str = "import";

#[derive(Clone)]
pub struct Db {
    path: Option<PathBuf>,
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Opens the database at the configured location.
    ///
    /// Uses `db_path` from the configuration when present, otherwise
    /// `tasks.db` inside the platform data directory.
    pub fn new() -> PlannerResult<Db> {
        let config = Config::read().map_err(|e| PlannerError::Io(std::io::Error::other(e.to_string())))?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> PlannerResult<Db> {
        Self::open(Self::resolve_path(config)?)
    }

    /// Database file location for `config`.
    pub fn resolve_path(config: &Config) -> PlannerResult<PathBuf> {
        match &config.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(DataStorage::new().get_path(DB_FILE_NAME)?),
        }
    }

    /// Opens (creating if needed) and migrates the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> PlannerResult<Db> {
        let path = path.as_ref().to_path_buf();
        let conn = Self::connect(&path)?;
        tracing::debug!(path = %path.display(), "database opened");

        Ok(Db {
            path: Some(path),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Migrated database that lives only as long as the handle.
    pub fn open_in_memory() -> PlannerResult<Db> {
        let mut conn = Connection::open_in_memory()?;
        init_with_migrations(&mut conn)?;

        Ok(Db {
            path: None,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Raw connection without applying migrations, for schema tooling.
    pub fn new_without_migrations(path: impl AsRef<Path>) -> PlannerResult<Connection> {
        Ok(Connection::open(path)?)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Locks the shared connection for one unit of work.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Writes a consistent snapshot of the live database to `dest`.
    pub fn export_to(&self, dest: impl AsRef<Path>) -> PlannerResult<()> {
        let dest = dest.as_ref();
        if dest.exists() {
            return Err(PlannerError::validation(format!("Export target already exists: {}", dest.display())));
        }
        let conn = self.conn();
        conn.execute("VACUUM INTO ?1", [dest.to_string_lossy()])?;
        tracing::info!(dest = %dest.display(), "database exported");
        Ok(())
    }

    /// Replaces the live database file with the one at `src`.
    ///
    /// The candidate is copied next to the live file and migrated first, so a
    /// corrupt upload never touches the live data. The swap then happens while
    /// holding the connection lock: the live file is moved to a backup, the
    /// candidate is moved into place and reopened. On failure the backup is
    /// restored and reopened.
    pub fn import_from(&self, src: impl AsRef<Path>) -> PlannerResult<()> {
        let src = src.as_ref();
        let live = self
            .path
            .clone()
            .ok_or_else(|| PlannerError::validation("An in-memory database cannot be replaced"))?;
        let staged = live.with_extension(IMPORT_SUFFIX);
        let backup = live.with_extension(BACKUP_SUFFIX);

        fs::copy(src, &staged)?;
        let checked = Self::connect(&staged).map(drop);
        remove_wal_files(&staged);
        if let Err(e) = checked {
            let _ = fs::remove_file(&staged);
            return Err(PlannerError::validation(format!(
                "Import failed: file is not a valid database or is corrupted: {}",
                e
            )));
        }

        let mut conn = self.conn();
        // Release the file before renaming it.
        *conn = Connection::open_in_memory()?;
        remove_wal_files(&live);

        if let Err(e) = fs::rename(&live, &backup) {
            if e.kind() != std::io::ErrorKind::NotFound {
                *conn = Self::connect(&live)?;
                let _ = fs::remove_file(&staged);
                return Err(e.into());
            }
            tracing::info!(path = %live.display(), "no current database file, skipping backup");
        }

        if let Err(e) = fs::rename(&staged, &live) {
            tracing::error!(error = %e, "failed to move imported database into place, restoring backup");
            if let Err(restore) = fs::rename(&backup, &live) {
                tracing::error!(backup = %backup.display(), error = %restore, "failed to restore database backup");
            }
            *conn = Self::connect(&live)?;
            return Err(e.into());
        }

        match Self::connect(&live) {
            Ok(imported) => *conn = imported,
            Err(e) => {
                tracing::error!(error = %e, "imported database failed to open, restoring backup");
                fs::rename(&backup, &live)?;
                *conn = Self::connect(&live)?;
                return Err(e);
            }
        }

        if let Err(e) = fs::remove_file(&backup) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(backup = %backup.display(), error = %e, "failed to remove database backup");
            }
        }
        tracing::info!(src = %src.display(), "database imported");
        Ok(())
    }

    fn connect(path: &Path) -> PlannerResult<Connection> {
        let mut conn = Connection::open(path)?;
        let mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!(path = %path.display(), journal_mode = %mode, "connection ready");
        init_with_migrations(&mut conn)?;
        Ok(conn)
    }
}

fn remove_wal_files(path: &Path) {
    for suffix in ["-wal", "-shm"] {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        let _ = fs::remove_file(PathBuf::from(sidecar));
    }
}
