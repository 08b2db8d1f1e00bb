//! # weekplan
//!
//! A personal week planner over an embedded SQLite database: dated and
//! undated tasks, repeating tasks that roll forward on their own, and ranked
//! full-text search.
//!
//! ```rust,no_run
//! use weekplan::db::{db::Db, search::Search, tasks::Tasks};
//! use weekplan::libs::occurrences::catch_up_recurring_occurrences;
//! use weekplan::libs::task::NewTask;
//!
//! let db = Db::new()?;
//! Tasks::new(&db).create(NewTask::new("Weekly review").repeating("weekly", 1))?;
//! catch_up_recurring_occurrences(&db)?;
//! let page = Search::new(&db).run("review", 1, 10)?;
//! # Ok::<(), weekplan::libs::error::PlannerError>(())
//! ```

pub mod commands;
pub mod db;
pub mod libs;
