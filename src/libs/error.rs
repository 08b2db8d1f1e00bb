//! Error taxonomy shared by the repository, the recurrence engine and search.
//!
//! Every error carries a machine-readable [`PlannerError::code`] and an
//! HTTP-equivalent [`PlannerError::status`] so that whatever front end sits on
//! top of the library (the bundled CLI, or a routing layer) can map it without
//! inspecting message text.

use chrono::NaiveDate;
use thiserror::Error;

/// Failures of the recurrence calculator and the occurrence engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    /// The task has no recurrence rule, so a next date is undefined.
    #[error("cannot calculate next due date for an empty recurrence rule")]
    InvalidRule,

    #[error("unsupported recurrence rule: {0}")]
    UnsupportedRule(String),

    #[error("recurring task {0} is missing a due date")]
    MissingDueDate(i64),

    /// The calculator returned a date that is not after its input.
    #[error("recurrence for task {task_id} did not advance past {date}")]
    DidNotAdvance { task_id: i64, date: NaiveDate },

    #[error("recurrence for task {task_id} exceeded {limit} iterations")]
    IterationCapExceeded { task_id: i64, limit: u32 },

    #[error("next due date is outside the supported calendar range")]
    OutOfRange,
}

/// Top-level error type of the planner core.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Client input is malformed (bad date, unknown field, empty title, ...).
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("recurrence error: {0}")]
    Recurrence(#[from] RecurrenceError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PlannerResult<T> = Result<T, PlannerError>;

impl PlannerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Stable machine-readable kind of the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) | Self::Io(_) => "storage_error",
            Self::Recurrence(_) => "recurrence_error",
        }
    }

    /// HTTP-equivalent status for the error kind.
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Recurrence(_) => 422,
            Self::Storage(_) | Self::Io(_) => 500,
        }
    }

    /// Message safe to show to a client.
    ///
    /// Storage and I/O failures only include the underlying error text when
    /// `expose_internal` is set; everything else is always shown verbatim.
    pub fn public_message(&self, expose_internal: bool) -> String {
        match self {
            Self::Storage(_) | Self::Io(_) if !expose_internal => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
