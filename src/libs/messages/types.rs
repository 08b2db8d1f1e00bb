/// Every user-facing message of the CLI.
///
/// Text lives in the `Display` impl in `display.rs`; call sites only pick a
/// variant and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // === TASK MESSAGES ===
    TaskCreated(i64, String), // id, title
    TaskUpdated(i64),
    TaskCompleted(i64),
    TaskDeleted(i64),
    TasksHeader(String), // filter label
    NoTasksFound,
    ConfirmDeleteTask(i64, String),
    TaskOrderUpdated(usize),
    InvalidOrderPair(String),
    InvalidDateArgument(String),

    // === RECURRENCE MESSAGES ===
    NextOccurrenceCreated(i64, String), // id, due date
    NextOccurrenceFailed(String),
    CatchUpSummary { examined: usize, created: usize, skipped: usize },
    CatchUpSkipped(i64, String),
    CatchUpFailed(String),

    // === SEARCH MESSAGES ===
    SearchResultsHeader(String, u32), // query, page
    NoSearchResults(String),

    // === INBOX MESSAGES ===
    InboxTitle(String),
    InboxTitleUpdated(String),

    // === WATCH MESSAGES ===
    WatchStarted(u64),
    DateChanged(String),
    WatchStopped,

    // === DATABASE MESSAGES ===
    DatabaseExported(String),
    DatabaseImported(String),
    ConfirmImport(String),
    DatabaseVersion(u32),
    DatabaseNeedsUpdate,
    DatabaseUpToDate,
    MigrationHistory,
    DatabasePath(String),

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigHeader,
    ConfigParseError(String),
    ConfigInvalidValue(String, String), // field, value
    PromptDbPath,
    PromptLogLevel,
    PromptWatchInterval,
    PromptSearchPageSize,

    // === GENERIC MESSAGES ===
    OperationCancelled,
    RequestFailed(&'static str, String), // error code, message
}
