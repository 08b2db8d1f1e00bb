use super::db::Db;
use crate::libs::error::{PlannerError, PlannerResult};
use crate::libs::occurrences::on_task_completed;
use crate::libs::task::{parse_date, NewTask, OrderUpdate, Task, TaskFilter, TaskPatch};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

pub(crate) const TASK_COLUMNS: &str =
    "id, title, due_date, completed, task_order, color, description, recurrence_rule, recurrence_interval";
const INSERT_TASK: &str = "INSERT INTO tasks
    (title, due_date, completed, task_order, color, description, recurrence_rule, recurrence_interval)
    VALUES (?1, ?2, 0, ?3, ?4, ?5, ?6, ?7)";
const UPDATE_ORDER: &str = "UPDATE tasks SET task_order = ?1 WHERE id = ?2";
const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1";
const ORDER_BY: &str = "ORDER BY task_order, id";

/// Result of [`Tasks::update`].
///
/// When the update completed a recurring task, `next_occurrence` holds the
/// spawned task. A failure to spawn it does not fail the update and is
/// reported in `recurrence_error` instead.
#[derive(Debug)]
pub struct TaskUpdate {
    pub task: Task,
    pub next_occurrence: Option<Task>,
    pub recurrence_error: Option<PlannerError>,
}

pub struct Tasks {
    db: Db,
}

impl Tasks {
    pub fn new(db: &Db) -> Self {
        Tasks { db: db.clone() }
    }

    pub fn create(&self, task: NewTask) -> PlannerResult<Task> {
        let task = task.validated()?;
        let conn = self.db.conn();
        let created = insert_task(&conn, &task)?;
        tracing::debug!(id = created.id, "task created");

        Ok(created)
    }

    pub fn get(&self, id: i64) -> PlannerResult<Task> {
        let conn = self.db.conn();
        select_task(&conn, id)?.ok_or_else(task_not_found)
    }

    /// Applies `patch` to the task `id`.
    ///
    /// Completing a recurring task that was not completed before spawns its
    /// next occurrence.
    pub fn update(&self, id: i64, patch: &TaskPatch) -> PlannerResult<TaskUpdate> {
        patch.validate()?;

        let (was_completed, task) = {
            let conn = self.db.conn();
            let before = select_task(&conn, id)?.ok_or_else(task_not_found)?;

            let (assignments, mut values) = patch_assignments(patch);
            let sql = format!("UPDATE tasks SET {} WHERE id = ?", assignments.join(", "));
            values.push(Value::Integer(id));
            conn.execute(&sql, params_from_iter(values))?;
            tracing::debug!(id, fields = assignments.len(), "task updated");

            let after = select_task(&conn, id)?.ok_or_else(task_not_found)?;
            (before.completed, after)
        };

        let mut outcome = TaskUpdate {
            task,
            next_occurrence: None,
            recurrence_error: None,
        };

        if patch.completes() && !was_completed {
            match on_task_completed(&self.db, &outcome.task) {
                Ok(next) => outcome.next_occurrence = next,
                Err(e) => {
                    tracing::error!(id, error = %e, "failed to create next occurrence");
                    outcome.recurrence_error = Some(e);
                }
            }
        }

        Ok(outcome)
    }

    /// Sets the order of several tasks at once. Either every row is updated
    /// or none is.
    pub fn bulk_update_order(&self, updates: &[OrderUpdate]) -> PlannerResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(UPDATE_ORDER)?;
            for update in updates {
                if stmt.execute(params![update.order, update.id])? == 0 {
                    return Err(PlannerError::not_found(format!("Task {} not found", update.id)));
                }
            }
        }
        tx.commit()?;
        tracing::debug!(count = updates.len(), "task order updated");

        Ok(())
    }

    pub fn delete(&self, id: i64) -> PlannerResult<()> {
        let conn = self.db.conn();
        if conn.execute(DELETE_TASK, params![id])? == 0 {
            return Err(task_not_found());
        }
        tracing::debug!(id, "task deleted");

        Ok(())
    }

    pub fn fetch(&self, filter: TaskFilter) -> PlannerResult<Vec<Task>> {
        let select = format!("SELECT {} FROM tasks", TASK_COLUMNS);
        let (sql, values): (String, Vec<Value>) = match filter {
            TaskFilter::All => (format!("{} {}", select, ORDER_BY), vec![]),
            TaskFilter::Inbox => (format!("{} WHERE due_date IS NULL {}", select, ORDER_BY), vec![]),
            TaskFilter::Day(day) => (
                format!("{} WHERE DATE(due_date) = DATE(?1) {}", select, ORDER_BY),
                vec![date_value(day)],
            ),
            TaskFilter::Range(start, end) => (
                format!("{} WHERE DATE(due_date) >= DATE(?1) AND DATE(due_date) <= DATE(?2) {}", select, ORDER_BY),
                vec![date_value(start), date_value(end)],
            ),
        };

        let conn = self.db.conn();
        let mut stmt = conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params_from_iter(values), map_task)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    /// String front door over [`Tasks::fetch`].
    pub fn get_tasks(&self, date: Option<&str>, start_date: Option<&str>, end_date: Option<&str>) -> PlannerResult<Vec<Task>> {
        self.fetch(TaskFilter::from_params(date, start_date, end_date)?)
    }
}

fn task_not_found() -> PlannerError {
    PlannerError::not_found("Task not found")
}

fn date_value(date: chrono::NaiveDate) -> Value {
    Value::Text(date.format(crate::libs::task::DATE_FORMAT).to_string())
}

fn patch_assignments(patch: &TaskPatch) -> (Vec<&'static str>, Vec<Value>) {
    let mut columns = Vec::new();
    let mut values = Vec::new();

    if let Some(title) = &patch.title {
        columns.push("title = ?");
        values.push(Value::Text(title.clone()));
    }
    if let Some(description) = &patch.description {
        columns.push("description = ?");
        values.push(Value::Text(description.clone()));
    }
    if let Some(due_date) = patch.due_date {
        columns.push("due_date = ?");
        values.push(due_date.map(date_value).unwrap_or(Value::Null));
    }
    if let Some(completed) = patch.completed {
        columns.push("completed = ?");
        values.push(Value::Integer(i64::from(completed)));
    }
    if let Some(color) = &patch.color {
        columns.push("color = ?");
        values.push(Value::Text(color.clone()));
    }
    if let Some(order) = patch.task_order {
        columns.push("task_order = ?");
        values.push(Value::Integer(order));
    }
    if let Some(rule) = patch.recurrence_rule {
        columns.push("recurrence_rule = ?");
        values.push(Value::Text(rule.map(|r| r.as_str().to_string()).unwrap_or_default()));
    }
    if let Some(interval) = patch.recurrence_interval {
        columns.push("recurrence_interval = ?");
        values.push(Value::Integer(interval));
    }

    (columns, values)
}

pub(crate) fn insert_task(conn: &Connection, task: &NewTask) -> rusqlite::Result<Task> {
    conn.execute(
        INSERT_TASK,
        params![
            task.title,
            task.due_date.map(date_value),
            task.order,
            task.color,
            task.description,
            task.recurrence_rule,
            task.recurrence_interval
        ],
    )?;

    Ok(Task {
        id: conn.last_insert_rowid(),
        title: task.title.clone(),
        due_date: task.due_date,
        completed: false,
        order: task.order,
        color: task.color.clone(),
        description: task.description.clone(),
        recurrence_rule: task.recurrence_rule.clone(),
        recurrence_interval: task.recurrence_interval,
    })
}

pub(crate) fn select_task(conn: &Connection, id: i64) -> rusqlite::Result<Option<Task>> {
    conn.query_row(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS), params![id], map_task)
        .optional()
}

/// Maps a row selected with [`TASK_COLUMNS`] (in that order) to a [`Task`].
pub(crate) fn map_task(row: &Row) -> rusqlite::Result<Task> {
    let due_date: Option<String> = row.get(2)?;
    let due_date = match due_date.as_deref().map(str::trim) {
        None | Some("") => None,
        // Rows written by other tools may carry a time part after the date.
        Some(text) => Some(
            parse_date(text.get(..10).unwrap_or(text))
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        ),
    };

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        due_date,
        completed: row.get(3)?,
        order: row.get(4)?,
        color: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        recurrence_rule: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        recurrence_interval: row.get(8)?,
    })
}
