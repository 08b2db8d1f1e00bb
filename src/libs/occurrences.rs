//! Creation of follow-up occurrences for repeating tasks.
//!
//! Two paths spawn a new occurrence: catching up on recurring tasks that were
//! left undone past their due date, and completing a recurring task.

use super::error::{PlannerError, PlannerResult, RecurrenceError};
use super::recurrence::{next_due_date, RecurrenceRule};
use super::task::{NewTask, Task, DATE_FORMAT};
use crate::db::db::Db;
use crate::db::tasks::{insert_task, map_task, TASK_COLUMNS};
use chrono::{Local, NaiveDate};
use rusqlite::{params, Transaction};

/// Upper bound on calculator steps for a single task during catch-up.
pub const MAX_CATCH_UP_ITERATIONS: u32 = 1000;

const SELECT_STALE_RECURRING: &str = "WHERE recurrence_rule != ''
    AND due_date IS NOT NULL
    AND DATE(due_date) < DATE(?1)
    AND completed = 0
    ORDER BY id";

/// A task the catch-up pass could not roll forward.
#[derive(Debug)]
pub struct SkippedTask {
    pub task_id: i64,
    pub error: PlannerError,
}

#[derive(Debug, Default)]
pub struct CatchUpReport {
    /// Number of stale recurring tasks found.
    pub examined: usize,
    pub created: Vec<Task>,
    pub skipped: Vec<SkippedTask>,
}

/// Catches up every stale recurring task as of the local calendar date.
pub fn catch_up_recurring_occurrences(db: &Db) -> PlannerResult<CatchUpReport> {
    catch_up_as_of(db, Local::now().date_naive())
}

/// Creates the next occurrence of every undone recurring task due before
/// `today`.
///
/// Each new occurrence is due on the first date after `today` reachable from
/// the original due date. All inserts share one transaction; a task that
/// cannot be rolled forward is logged, rolled back to its savepoint and
/// reported as skipped without affecting the others.
pub fn catch_up_as_of(db: &Db, today: NaiveDate) -> PlannerResult<CatchUpReport> {
    let mut conn = db.conn();
    let mut tx = conn.transaction()?;

    let stale = select_stale(&tx, today)?;
    let mut report = CatchUpReport {
        examined: stale.len(),
        ..CatchUpReport::default()
    };
    tracing::debug!(count = stale.len(), %today, "stale recurring tasks found");

    for task in stale {
        let spawned = first_occurrence_after(&task, today)
            .map_err(PlannerError::from)
            .and_then(|due_date| spawn_in_savepoint(&mut tx, &NewTask::occurrence_of(&task, due_date)));

        match spawned {
            Ok(created) => {
                tracing::info!(task_id = task.id, new_task_id = created.id, due_date = %created.due_date_label(), "created next occurrence");
                report.created.push(created);
            }
            Err(error) => {
                tracing::error!(task_id = task.id, error = %error, "skipping recurring task");
                report.skipped.push(SkippedTask { task_id: task.id, error });
            }
        }
    }

    tx.commit()?;
    Ok(report)
}

/// Spawns the next occurrence of a task that has just been completed.
///
/// Returns `None` for tasks that do not repeat.
pub fn on_task_completed(db: &Db, task: &Task) -> PlannerResult<Option<Task>> {
    if !task.is_recurring() {
        return Ok(None);
    }
    let due_date = task.due_date.ok_or(RecurrenceError::MissingDueDate(task.id))?;
    let next = next_due_date(due_date, &task.recurrence_rule, task.recurrence_interval)?;

    let conn = db.conn();
    let created = insert_task(&conn, &NewTask::occurrence_of(task, next))?;
    tracing::info!(task_id = task.id, new_task_id = created.id, due_date = %next.format(DATE_FORMAT), "created next occurrence");

    Ok(Some(created))
}

/// First date after `today` reached by stepping `task`'s rule from its due date.
fn first_occurrence_after(task: &Task, today: NaiveDate) -> Result<NaiveDate, RecurrenceError> {
    let mut date = task.due_date.ok_or(RecurrenceError::MissingDueDate(task.id))?;
    let rule: RecurrenceRule = task.recurrence_rule.parse()?;

    let mut steps = 0;
    while date <= today {
        if steps == MAX_CATCH_UP_ITERATIONS {
            return Err(RecurrenceError::IterationCapExceeded {
                task_id: task.id,
                limit: MAX_CATCH_UP_ITERATIONS,
            });
        }
        let next = rule.advance(date, task.recurrence_interval)?;
        if next <= date {
            return Err(RecurrenceError::DidNotAdvance { task_id: task.id, date });
        }
        date = next;
        steps += 1;
    }

    Ok(date)
}

fn select_stale(tx: &Transaction, today: NaiveDate) -> rusqlite::Result<Vec<Task>> {
    let mut stmt = tx.prepare(&format!("SELECT {} FROM tasks {}", TASK_COLUMNS, SELECT_STALE_RECURRING))?;
    let tasks = stmt
        .query_map(params![today.format(DATE_FORMAT).to_string()], map_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

fn spawn_in_savepoint(tx: &mut Transaction, task: &NewTask) -> PlannerResult<Task> {
    let savepoint = tx.savepoint()?;
    let created = insert_task(&savepoint, task)?;
    savepoint.commit()?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn recurring(rule: &str, interval: i64, due_date: Option<NaiveDate>) -> Task {
        Task {
            id: 7,
            title: "Water plants".to_string(),
            due_date,
            completed: false,
            order: 2,
            color: String::new(),
            description: String::new(),
            recurrence_rule: rule.to_string(),
            recurrence_interval: interval,
        }
    }

    #[test]
    fn lands_strictly_after_today() {
        let today = date(2024, 6, 11);
        let task = recurring("daily", 1, Some(date(2024, 6, 1)));
        assert_eq!(first_occurrence_after(&task, today).unwrap(), date(2024, 6, 12));

        let task = recurring("weekly", 1, Some(date(2024, 6, 4)));
        assert_eq!(first_occurrence_after(&task, today).unwrap(), date(2024, 6, 18));

        let task = recurring("weekly", 1, Some(date(2024, 6, 10)));
        assert_eq!(first_occurrence_after(&task, date(2024, 6, 17)).unwrap(), date(2024, 6, 24));
    }

    #[test]
    fn monthly_catch_up_keeps_overflow_semantics() {
        let task = recurring("monthly", 1, Some(date(2024, 1, 31)));
        assert_eq!(first_occurrence_after(&task, date(2024, 2, 10)).unwrap(), date(2024, 3, 2));
    }

    #[test]
    fn iteration_cap_is_enforced() {
        let task = recurring("daily", 1, Some(date(2020, 1, 1)));
        assert_eq!(
            first_occurrence_after(&task, date(2024, 1, 1)),
            Err(RecurrenceError::IterationCapExceeded { task_id: 7, limit: MAX_CATCH_UP_ITERATIONS })
        );
    }

    #[test]
    fn bad_rows_are_reported() {
        let today = date(2024, 6, 11);
        assert_eq!(
            first_occurrence_after(&recurring("hourly", 1, Some(date(2024, 6, 1))), today),
            Err(RecurrenceError::UnsupportedRule("hourly".to_string()))
        );
        assert_eq!(
            first_occurrence_after(&recurring("daily", 1, None), today),
            Err(RecurrenceError::MissingDueDate(7))
        );
    }
}
