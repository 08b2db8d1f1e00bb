//! Persistence layer over a single SQLite database.
//!
//! ```rust,no_run
//! use weekplan::db::{db::Db, tasks::Tasks};
//! use weekplan::libs::task::NewTask;
//!
//! let db = Db::open("tasks.db")?;
//! let task = Tasks::new(&db).create(NewTask::new("Review code"))?;
//! # Ok::<(), weekplan::libs::error::PlannerError>(())
//! ```

/// Shared connection handle, import and export.
pub mod db;

/// Versioned schema changes.
pub mod migrations;

/// Ranked full-text search.
pub mod search;

/// Key/value settings such as the inbox title.
pub mod settings;

/// Task CRUD, ordering and list filters.
pub mod tasks;
