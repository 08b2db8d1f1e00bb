//! Ranked full-text search over task titles and descriptions.
//!
//! Results are ordered by, in turn: whether the title starts with the raw
//! query, how close the due date is to today, full-text relevance, and the
//! due date itself. Undated tasks carry no date score and sort after dated
//! ones within the same boost group.

use super::db::Db;
use super::tasks::map_task;
use crate::libs::error::{PlannerError, PlannerResult};
use crate::libs::task::Task;
use chrono::{Local, NaiveDate};
use rusqlite::params;
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

const FTS5_OPERATORS: [&str; 4] = ["AND", "OR", "NOT", "NEAR"];

const SEARCH_TASKS: &str = "
SELECT
    tasks.id, tasks.title, tasks.due_date, tasks.completed, tasks.task_order,
    tasks.color, tasks.description, tasks.recurrence_rule, tasks.recurrence_interval,
    (CASE WHEN tasks.title LIKE ?2 ESCAPE '\\' THEN 1 ELSE 0 END) AS exact_match_boost,
    ABS(JULIANDAY(?3) - JULIANDAY(tasks.due_date)) AS date_proximity,
    -tasks_fts.rank AS relevance
FROM tasks_fts
JOIN tasks ON tasks.id = tasks_fts.rowid
WHERE tasks_fts MATCH ?1
ORDER BY
    exact_match_boost DESC,
    (CASE WHEN date_proximity < 1 THEN 1000.0 ELSE 100.0 / (date_proximity + 1) END) DESC,
    relevance DESC,
    tasks.due_date DESC,
    tasks.id
LIMIT ?4 OFFSET ?5";

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub page: u32,
    pub page_size: u32,
    pub tasks: Vec<Task>,
}

/// Turns raw user input into an FTS5 match expression.
///
/// Returns the expression and whether it was quoted. Barewords (letters,
/// digits and `_` only, and not an FTS5 operator) become prefix queries;
/// anything else is matched as an exact phrase with inner quotes doubled.
pub fn escape_fts5_query(raw: &str) -> (String, bool) {
    let escaped = raw.replace('"', "\"\"");
    let bareword = !raw.is_empty()
        && raw.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !FTS5_OPERATORS.contains(&raw);

    if bareword {
        (format!("{}*", escaped), false)
    } else {
        (format!("\"{}\"", escaped), true)
    }
}

/// `LIKE` pattern matching titles that start with `raw`.
fn title_prefix_pattern(raw: &str) -> String {
    let mut pattern = String::with_capacity(raw.len() + 1);
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub struct Search {
    db: Db,
}

impl Search {
    pub fn new(db: &Db) -> Self {
        Search { db: db.clone() }
    }

    pub fn run(&self, query: &str, page: u32, page_size: u32) -> PlannerResult<SearchPage> {
        self.run_as_of(query, page, page_size, Local::now().date_naive())
    }

    /// Same as [`Search::run`] with date proximity measured from `today`.
    pub fn run_as_of(&self, query: &str, page: u32, page_size: u32, today: NaiveDate) -> PlannerResult<SearchPage> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PlannerError::validation("query required"));
        }
        if page < 1 {
            return Err(PlannerError::validation("Invalid page number"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(PlannerError::validation(format!("Invalid page size (must be between 1 and {})", MAX_PAGE_SIZE)));
        }
        let offset = i64::from(page - 1) * i64::from(page_size);

        let (match_expr, quoted) = escape_fts5_query(query);
        let prefix = title_prefix_pattern(query);
        tracing::debug!(fts_query = %match_expr, quoted, exact_query = %prefix, page, page_size, "searching tasks");

        let conn = self.db.conn();
        let mut stmt = conn.prepare(SEARCH_TASKS)?;
        let tasks = stmt
            .query_map(
                params![match_expr, prefix, today.format(crate::libs::task::DATE_FORMAT).to_string(), page_size, offset],
                map_task,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchPage { page, page_size, tasks })
    }
}
