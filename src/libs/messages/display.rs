//! Text of every [`Message`].
//!
//! All user-visible wording is defined here so that call sites stay free of
//! string literals.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s = match self {
            // === TASK MESSAGES ===
            Message::TaskCreated(id, title) => format!("Task #{} created: {}", id, title),
            Message::TaskUpdated(id) => format!("Task #{} updated", id),
            Message::TaskCompleted(id) => format!("Task #{} marked as done", id),
            Message::TaskDeleted(id) => format!("Task #{} deleted", id),
            Message::TasksHeader(label) => format!("Tasks ({})", label),
            Message::NoTasksFound => "No tasks found".to_string(),
            Message::ConfirmDeleteTask(id, title) => format!("Delete task #{} \"{}\"?", id, title),
            Message::TaskOrderUpdated(count) => format!("Order updated for {} task(s)", count),
            Message::InvalidOrderPair(pair) => format!("Invalid order pair '{}', expected <id>=<order>", pair),
            Message::InvalidDateArgument(value) => format!("Invalid date '{}', expected YYYY-MM-DD", value),

            // === RECURRENCE MESSAGES ===
            Message::NextOccurrenceCreated(id, due_date) => format!("Next occurrence #{} scheduled for {}", id, due_date),
            Message::NextOccurrenceFailed(error) => format!("Task updated, but the next occurrence was not created: {}", error),
            Message::CatchUpSummary { examined, created, skipped } => format!(
                "Recurring tasks checked: {}, occurrences created: {}, skipped: {}",
                examined, created, skipped
            ),
            Message::CatchUpSkipped(id, reason) => format!("Task #{} skipped: {}", id, reason),
            Message::CatchUpFailed(error) => format!("Failed to catch up recurring tasks: {}", error),

            // === SEARCH MESSAGES ===
            Message::SearchResultsHeader(query, page) => format!("Results for \"{}\" (page {})", query, page),
            Message::NoSearchResults(query) => format!("Nothing matches \"{}\"", query),

            // === INBOX MESSAGES ===
            Message::InboxTitle(title) => format!("Inbox title: {}", title),
            Message::InboxTitleUpdated(title) => format!("Inbox title set to {}", title),

            // === WATCH MESSAGES ===
            Message::WatchStarted(interval) => format!("Watching for date changes every {}s, press Ctrl+C to stop", interval),
            Message::DateChanged(date) => format!("Date changed to {}, catching up recurring tasks", date),
            Message::WatchStopped => "Watch stopped".to_string(),

            // === DATABASE MESSAGES ===
            Message::DatabaseExported(path) => format!("Database exported to {}", path),
            Message::DatabaseImported(path) => format!("Database imported from {}", path),
            Message::ConfirmImport(path) => format!("Replace all current data with {}?", path),
            Message::DatabaseVersion(version) => format!("Database version: {}", version),
            Message::DatabaseNeedsUpdate => "Database needs migration".to_string(),
            Message::DatabaseUpToDate => "Database is up to date".to_string(),
            Message::MigrationHistory => "Migration history:".to_string(),
            Message::DatabasePath(path) => format!("Database: {}", path),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved".to_string(),
            Message::ConfigHeader => "Current configuration:".to_string(),
            Message::ConfigParseError(error) => format!("Failed to parse configuration: {}", error),
            Message::ConfigInvalidValue(field, value) => format!("Invalid value for {}: '{}'", field, value),
            Message::PromptDbPath => "Database file (empty for default location)".to_string(),
            Message::PromptLogLevel => "Log level (trace, debug, info, warn, error)".to_string(),
            Message::PromptWatchInterval => "Date-change check interval in seconds".to_string(),
            Message::PromptSearchPageSize => "Search results per page".to_string(),

            // === GENERIC MESSAGES ===
            Message::OperationCancelled => "Operation cancelled".to_string(),
            Message::RequestFailed(code, message) => format!("{} ({})", message, code),
        };
        write!(f, "{}", s)
    }
}
