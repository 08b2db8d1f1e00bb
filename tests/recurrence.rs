#[cfg(test)]
mod tests {
    use chrono::{Days, Local, NaiveDate};
    use rusqlite::params;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use weekplan::db::db::Db;
    use weekplan::db::tasks::Tasks;
    use weekplan::libs::error::{PlannerError, RecurrenceError};
    use weekplan::libs::occurrences::{catch_up_as_of, catch_up_recurring_occurrences, on_task_completed, MAX_CATCH_UP_ITERATIONS};
    use weekplan::libs::task::{NewTask, TaskFilter, TaskPatch};

    struct RecurrenceTestContext {
        _temp_dir: TempDir,
        db: Db,
    }

    impl TestContext for RecurrenceTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("tasks.db")).unwrap();
            RecurrenceTestContext { _temp_dir: temp_dir, db }
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn insert_raw(db: &Db, title: &str, due_date: &str, rule: &str) -> i64 {
        let conn = db.conn();
        conn.execute(
            "INSERT INTO tasks (title, due_date, recurrence_rule, recurrence_interval) VALUES (?1, ?2, ?3, 1)",
            params![title, due_date, rule],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_catch_up_lands_after_today(ctx: &mut RecurrenceTestContext) {
        let tasks = Tasks::new(&ctx.db);
        let today = date(2024, 6, 20);
        let mut overdue = NewTask::new("Journal").due(date(2024, 6, 10)).repeating("daily", 1);
        overdue.description = "Three lines".to_string();
        overdue.order = 3;
        let original = tasks.create(overdue).unwrap();

        let report = catch_up_as_of(&ctx.db, today).unwrap();

        assert_eq!(report.examined, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(report.created.len(), 1);
        let created = &report.created[0];
        assert_eq!(created.due_date, Some(date(2024, 6, 21)));
        assert_eq!(created.title, "Journal");
        assert_eq!(created.description, "Three lines");
        assert_eq!(created.order, 0);
        assert!(!created.completed);

        // The stale original is left as it was.
        assert_eq!(tasks.get(original.id).unwrap(), original);
        assert_eq!(tasks.get(created.id).unwrap(), *created);
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_catch_up_ignores_completed_current_and_plain_tasks(ctx: &mut RecurrenceTestContext) {
        let tasks = Tasks::new(&ctx.db);
        let today = date(2024, 6, 20);

        let done = tasks.create(NewTask::new("Done").due(date(2024, 6, 10)).repeating("daily", 1)).unwrap();
        let conn = ctx.db.conn();
        conn.execute("UPDATE tasks SET completed = 1 WHERE id = ?1", params![done.id]).unwrap();
        drop(conn);
        tasks.create(NewTask::new("Due today").due(today).repeating("weekly", 1)).unwrap();
        tasks.create(NewTask::new("One-off").due(date(2024, 6, 1))).unwrap();
        tasks.create(NewTask::new("Undated").repeating("daily", 1)).unwrap();

        let report = catch_up_as_of(&ctx.db, today).unwrap();
        assert_eq!(report.examined, 0);
        assert!(report.created.is_empty());
        assert_eq!(tasks.fetch(TaskFilter::All).unwrap().len(), 4);
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_catch_up_skips_bad_rows_and_continues(ctx: &mut RecurrenceTestContext) {
        let today = date(2024, 6, 20);
        let hourly = insert_raw(&ctx.db, "Hourly stretch", "2024-06-18", "hourly");
        let ancient = insert_raw(&ctx.db, "Ancient", "2015-01-01", "daily");
        let good = insert_raw(&ctx.db, "Weekly review", "2024-06-14", "weekly");

        let report = catch_up_as_of(&ctx.db, today).unwrap();

        assert_eq!(report.examined, 3);
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].title, "Weekly review");
        assert_eq!(report.created[0].due_date, Some(date(2024, 6, 21)));

        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].task_id, hourly);
        assert!(matches!(
            &report.skipped[0].error,
            PlannerError::Recurrence(RecurrenceError::UnsupportedRule(rule)) if rule == "hourly"
        ));
        assert_eq!(report.skipped[1].task_id, ancient);
        assert!(matches!(
            &report.skipped[1].error,
            PlannerError::Recurrence(RecurrenceError::IterationCapExceeded { limit, .. }) if *limit == MAX_CATCH_UP_ITERATIONS
        ));

        let tasks = Tasks::new(&ctx.db);
        assert_eq!(tasks.fetch(TaskFilter::All).unwrap().len(), 4);
        assert!(tasks.get(good).is_ok());
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_catch_up_uses_overflow_month_arithmetic(ctx: &mut RecurrenceTestContext) {
        let tasks = Tasks::new(&ctx.db);
        tasks.create(NewTask::new("Pay rent").due(date(2024, 1, 31)).repeating("monthly", 1)).unwrap();

        let report = catch_up_as_of(&ctx.db, date(2024, 2, 5)).unwrap();
        assert_eq!(report.created[0].due_date, Some(date(2024, 3, 2)));
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_catch_up_against_the_clock(ctx: &mut RecurrenceTestContext) {
        let tasks = Tasks::new(&ctx.db);
        let today = Local::now().date_naive();
        let ten_days_ago = today.checked_sub_days(Days::new(10)).unwrap();
        tasks.create(NewTask::new("Stand-up notes").due(ten_days_ago).repeating("daily", 1)).unwrap();

        let report = catch_up_recurring_occurrences(&ctx.db).unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].due_date, today.checked_add_days(Days::new(1)));
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_on_task_completed(ctx: &mut RecurrenceTestContext) {
        let tasks = Tasks::new(&ctx.db);
        let yearly = tasks.create(NewTask::new("Birthday").due(date(2024, 2, 29)).repeating("yearly", 1)).unwrap();
        let plain = tasks.create(NewTask::new("Once").due(date(2024, 2, 29))).unwrap();

        let next = on_task_completed(&ctx.db, &yearly).unwrap().unwrap();
        assert_eq!(next.due_date, Some(date(2025, 3, 1)));
        assert!(on_task_completed(&ctx.db, &plain).unwrap().is_none());
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_completion_then_catch_up(ctx: &mut RecurrenceTestContext) {
        let tasks = Tasks::new(&ctx.db);
        let task = tasks.create(NewTask::new("Backup").due(date(2024, 6, 1)).repeating("weekly", 1)).unwrap();

        let outcome = tasks.update(task.id, &TaskPatch::mark_completed()).unwrap();
        assert_eq!(outcome.next_occurrence.as_ref().unwrap().due_date, Some(date(2024, 6, 8)));

        // The spawned occurrence is itself overdue by now and gets caught up.
        let report = catch_up_as_of(&ctx.db, date(2024, 6, 20)).unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.created[0].due_date, Some(date(2024, 6, 22)));
    }
}
