//! Task entity, creation payload, partial-update patch and list filters.

use super::error::{PlannerError, PlannerResult};
use super::recurrence::RecurrenceRule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Calendar date format accepted on every input and used for storage.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter value selecting undated tasks.
pub const INBOX: &str = "inbox";

/// Parses a `YYYY-MM-DD` string.
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub order: i64,
    pub color: String,
    pub description: String,
    pub recurrence_rule: String,
    pub recurrence_interval: i64,
}

impl Task {
    pub fn is_recurring(&self) -> bool {
        !self.recurrence_rule.is_empty()
    }

    /// Due date as shown to users; inbox tasks render as an empty string.
    pub fn due_date_label(&self) -> String {
        self.due_date.map(|date| date.format(DATE_FORMAT).to_string()).unwrap_or_default()
    }
}

/// Payload for creating a task. New tasks always start incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewTask {
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub order: i64,
    pub color: String,
    pub description: String,
    pub recurrence_rule: String,
    pub recurrence_interval: i64,
}

impl Default for NewTask {
    fn default() -> Self {
        Self {
            title: String::new(),
            due_date: None,
            order: 0,
            color: String::new(),
            description: String::new(),
            recurrence_rule: String::new(),
            recurrence_interval: 1,
        }
    }
}

impl NewTask {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn repeating(mut self, rule: &str, interval: i64) -> Self {
        self.recurrence_rule = rule.to_string();
        self.recurrence_interval = interval;
        self
    }

    /// Next occurrence of `task`: same title, description, color and
    /// recurrence, a fresh due date, order reset to 0.
    pub fn occurrence_of(task: &Task, due_date: NaiveDate) -> Self {
        Self {
            title: task.title.clone(),
            due_date: Some(due_date),
            order: 0,
            color: task.color.clone(),
            description: task.description.clone(),
            recurrence_rule: task.recurrence_rule.clone(),
            recurrence_interval: task.recurrence_interval,
        }
    }

    /// Checks the payload. The interval is reset to 1 when no rule is set.
    pub fn validated(mut self) -> PlannerResult<Self> {
        if self.title.trim().is_empty() {
            return Err(PlannerError::validation("Task title is required"));
        }
        let rule = RecurrenceRule::parse_optional(&self.recurrence_rule)
            .map_err(|_| PlannerError::validation(format!("Invalid recurrence_rule value: {}", self.recurrence_rule)))?;
        match rule {
            Some(_) if self.recurrence_interval < 1 => {
                return Err(PlannerError::validation("Invalid recurrence_interval (must be a number >= 1)"));
            }
            Some(_) => {}
            None => self.recurrence_interval = 1,
        }
        Ok(self)
    }
}

/// Fields accepted by a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchField {
    Title,
    Description,
    DueDate,
    Completed,
    Color,
    TaskOrder,
    RecurrenceRule,
    RecurrenceInterval,
}

impl FromStr for PatchField {
    type Err = PlannerError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            "due_date" => Ok(Self::DueDate),
            "completed" => Ok(Self::Completed),
            "color" => Ok(Self::Color),
            "task_order" => Ok(Self::TaskOrder),
            "recurrence_rule" => Ok(Self::RecurrenceRule),
            "recurrence_interval" => Ok(Self::RecurrenceInterval),
            other => Err(PlannerError::validation(format!("Unknown field for update: {}", other))),
        }
    }
}

/// Partial update of a task. `None` leaves a field untouched.
///
/// `due_date` and `recurrence_rule` are doubly optional: `Some(None)` clears
/// the date (moving the task to the inbox) or the rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub completed: Option<bool>,
    pub color: Option<String>,
    pub task_order: Option<i64>,
    pub recurrence_rule: Option<Option<RecurrenceRule>>,
    pub recurrence_interval: Option<i64>,
}

impl TaskPatch {
    pub fn mark_completed() -> Self {
        Self {
            completed: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the patch marks the task as done.
    pub fn completes(&self) -> bool {
        self.completed == Some(true)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if self.is_empty() {
            return Err(PlannerError::validation("No fields to update"));
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(PlannerError::validation("Invalid title"));
            }
        }
        if let Some(interval) = self.recurrence_interval {
            if interval < 1 {
                return Err(PlannerError::validation("Invalid recurrence_interval (must be a number >= 1)"));
            }
        }
        Ok(())
    }

    /// Builds a patch from a JSON object, validating every key and value.
    pub fn from_json(body: &Value) -> PlannerResult<Self> {
        let fields = body.as_object().ok_or_else(|| PlannerError::validation("Invalid request body format"))?;

        let mut patch = Self::default();
        for (key, value) in fields {
            match key.parse::<PatchField>()? {
                PatchField::Title => {
                    let title = value.as_str().filter(|title| !title.trim().is_empty());
                    patch.title = Some(title.ok_or_else(|| PlannerError::validation("Invalid title"))?.to_string());
                }
                PatchField::Description => patch.description = Some(nullable_string(value, "description")?),
                PatchField::Color => patch.color = Some(nullable_string(value, "color")?),
                PatchField::DueDate => {
                    let due_date = match value {
                        Value::Null => None,
                        Value::String(date) if date.is_empty() => None,
                        Value::String(date) => Some(
                            parse_date(date).map_err(|e| PlannerError::validation(format!("Invalid due date format: {}", e)))?,
                        ),
                        _ => return Err(PlannerError::validation("Invalid due date format (not a string or null)")),
                    };
                    patch.due_date = Some(due_date);
                }
                PatchField::Completed => {
                    let completed = match value {
                        Value::Bool(flag) => *flag,
                        Value::Number(n) if n.as_f64() == Some(0.0) => false,
                        Value::Number(n) if n.as_f64() == Some(1.0) => true,
                        _ => return Err(PlannerError::validation("Invalid completed status (must be boolean, 0, or 1)")),
                    };
                    patch.completed = Some(completed);
                }
                PatchField::TaskOrder => {
                    let order = whole_number(value).ok_or_else(|| PlannerError::validation("Invalid task order format (must be a number)"))?;
                    patch.task_order = Some(order);
                }
                PatchField::RecurrenceRule => {
                    let rule = value
                        .as_str()
                        .ok_or_else(|| PlannerError::validation("Invalid recurrence_rule format (must be string)"))?;
                    let parsed = RecurrenceRule::parse_optional(rule)
                        .map_err(|_| PlannerError::validation(format!("Invalid recurrence_rule value: {}", rule)))?;
                    patch.recurrence_rule = Some(parsed);
                }
                PatchField::RecurrenceInterval => {
                    let interval = whole_number(value)
                        .filter(|interval| *interval >= 1)
                        .ok_or_else(|| PlannerError::validation("Invalid recurrence_interval (must be a number >= 1)"))?;
                    patch.recurrence_interval = Some(interval);
                }
            }
        }

        patch.validate()?;
        Ok(patch)
    }
}

fn nullable_string(value: &Value, field: &str) -> PlannerResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text.clone()),
        _ => Err(PlannerError::validation(format!("Invalid {} format (must be string or null)", field))),
    }
}

// JSON numbers arrive as floats from some clients; accept them when integral.
fn whole_number(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64).map(|n| n as i64))
}

/// New position of a task within its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: i64,
    pub order: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    Inbox,
    Day(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl TaskFilter {
    /// Resolves the `date`, `start_date` and `end_date` list parameters.
    ///
    /// `date=inbox` wins, then a complete start/end pair, then a single date.
    /// With nothing set every task is returned.
    pub fn from_params(date: Option<&str>, start_date: Option<&str>, end_date: Option<&str>) -> PlannerResult<Self> {
        let date = date.filter(|d| !d.is_empty());
        let start_date = start_date.filter(|d| !d.is_empty());
        let end_date = end_date.filter(|d| !d.is_empty());

        if date == Some(INBOX) {
            return Ok(Self::Inbox);
        }
        if let (Some(start), Some(end)) = (start_date, end_date) {
            let start = parse_date(start).map_err(|_| PlannerError::validation("Invalid start date format"))?;
            let end = parse_date(end).map_err(|_| PlannerError::validation("Invalid end date format"))?;
            return Ok(Self::Range(start, end));
        }
        if let Some(date) = date {
            let day = parse_date(date).map_err(|_| PlannerError::validation("Invalid date format"))?;
            return Ok(Self::Day(day));
        }
        Ok(Self::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_field_is_rejected() {
        let err = TaskPatch::from_json(&json!({"foo": 1})).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Unknown field for update: foo");
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = TaskPatch::from_json(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "No fields to update");
    }

    #[test]
    fn patch_fields_are_typed() {
        let patch = TaskPatch::from_json(&json!({
            "title": "Plan sprint",
            "due_date": "2024-06-01",
            "completed": 1,
            "task_order": 3.0,
            "recurrence_rule": "weekly",
            "recurrence_interval": 2,
            "description": null
        }))
        .unwrap();

        assert_eq!(patch.title.as_deref(), Some("Plan sprint"));
        assert_eq!(patch.due_date, Some(NaiveDate::from_ymd_opt(2024, 6, 1)));
        assert!(patch.completes());
        assert_eq!(patch.task_order, Some(3));
        assert_eq!(patch.recurrence_rule, Some(Some(RecurrenceRule::Weekly)));
        assert_eq!(patch.recurrence_interval, Some(2));
        assert_eq!(patch.description.as_deref(), Some(""));
        assert_eq!(patch.color, None);
    }

    #[test]
    fn clearing_values() {
        let patch = TaskPatch::from_json(&json!({"due_date": "", "recurrence_rule": ""})).unwrap();
        assert_eq!(patch.due_date, Some(None));
        assert_eq!(patch.recurrence_rule, Some(None));
    }

    #[test]
    fn field_checks() {
        for body in [
            json!({"title": ""}),
            json!({"title": 5}),
            json!({"due_date": "01/06/2024"}),
            json!({"completed": 2}),
            json!({"completed": "yes"}),
            json!({"task_order": "first"}),
            json!({"recurrence_rule": "hourly"}),
            json!({"recurrence_interval": 0}),
            json!({"recurrence_interval": 1.5}),
            json!({"color": 3}),
            json!(["title"]),
        ] {
            let err = TaskPatch::from_json(&body).unwrap_err();
            assert!(err.is_validation(), "expected validation error for {}", body);
        }
    }

    #[test]
    fn new_task_interval_checks() {
        assert!(NewTask::new("Water plants").repeating("daily", 0).validated().unwrap_err().is_validation());
        assert_eq!(NewTask::new("Water plants").repeating("daily", 3).validated().unwrap().recurrence_interval, 3);

        let task = NewTask::new("One-off").repeating("", 5).validated().unwrap();
        assert_eq!(task.recurrence_interval, 1);

        assert!(NewTask::new("  ").validated().unwrap_err().is_validation());
        assert!(NewTask::new("Bad").repeating("hourly", 1).validated().unwrap_err().is_validation());
    }

    #[test]
    fn filter_precedence() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(TaskFilter::from_params(Some("inbox"), Some("2024-06-01"), Some("2024-06-07")).unwrap(), TaskFilter::Inbox);
        assert_eq!(
            TaskFilter::from_params(Some("2024-06-03"), Some("2024-06-01"), Some("2024-06-07")).unwrap(),
            TaskFilter::Range(day, NaiveDate::from_ymd_opt(2024, 6, 7).unwrap())
        );
        assert_eq!(TaskFilter::from_params(Some("2024-06-01"), Some("2024-06-01"), None).unwrap(), TaskFilter::Day(day));
        assert_eq!(TaskFilter::from_params(None, None, None).unwrap(), TaskFilter::All);
        assert!(TaskFilter::from_params(Some("June"), None, None).unwrap_err().is_validation());
        assert!(TaskFilter::from_params(None, Some("2024-13-01"), Some("2024-06-07")).unwrap_err().is_validation());
    }
}
