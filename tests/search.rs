#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use weekplan::db::db::Db;
    use weekplan::db::search::Search;
    use weekplan::db::tasks::Tasks;
    use weekplan::libs::task::{NewTask, TaskPatch};

    struct SearchTestContext {
        _temp_dir: TempDir,
        db: Db,
    }

    impl TestContext for SearchTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join("tasks.db")).unwrap();
            SearchTestContext { _temp_dir: temp_dir, db }
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 10)
    }

    fn titles(ctx: &SearchTestContext, query: &str) -> Vec<String> {
        Search::new(&ctx.db)
            .run_as_of(query, 1, 10, today())
            .unwrap()
            .tasks
            .into_iter()
            .map(|t| t.title)
            .collect()
    }

    #[test_context(SearchTestContext)]
    #[test]
    fn test_title_prefix_ranks_first(ctx: &mut SearchTestContext) {
        let tasks = Tasks::new(&ctx.db);
        tasks.create(NewTask::new("annual report summary").due(today())).unwrap();
        tasks.create(NewTask::new("report")).unwrap();

        assert_eq!(titles(ctx, "report"), vec!["report", "annual report summary"]);
        // Prefix matching on the last word.
        assert_eq!(titles(ctx, "rep").len(), 2);
        // Case-insensitive boost.
        assert_eq!(titles(ctx, "Report")[0], "report");
    }

    #[test_context(SearchTestContext)]
    #[test]
    fn test_closer_dates_rank_higher(ctx: &mut SearchTestContext) {
        let tasks = Tasks::new(&ctx.db);
        tasks.create(NewTask::new("Gym far future").due(date(2024, 7, 30))).unwrap();
        tasks.create(NewTask::new("Gym undated")).unwrap();
        tasks.create(NewTask::new("Gym today").due(today())).unwrap();
        tasks.create(NewTask::new("Gym last week").due(date(2024, 6, 3))).unwrap();

        assert_eq!(titles(ctx, "gym"), vec!["Gym today", "Gym last week", "Gym far future", "Gym undated"]);
    }

    #[test_context(SearchTestContext)]
    #[test]
    fn test_phrases_and_descriptions(ctx: &mut SearchTestContext) {
        let tasks = Tasks::new(&ctx.db);
        tasks.create(NewTask::new("Prepare team meeting notes")).unwrap();
        tasks.create(NewTask::new("Meeting with the team")).unwrap();
        let mut described = NewTask::new("Call supplier");
        described.description = "Ask about the team meeting room".to_string();
        tasks.create(described).unwrap();

        let found = titles(ctx, "team meeting");
        assert_eq!(found.len(), 2);
        assert!(found.contains(&"Prepare team meeting notes".to_string()));
        assert!(found.contains(&"Call supplier".to_string()));
    }

    #[test_context(SearchTestContext)]
    #[test]
    fn test_special_characters_do_not_break_the_query(ctx: &mut SearchTestContext) {
        let tasks = Tasks::new(&ctx.db);
        tasks.create(NewTask::new("100% done checklist")).unwrap();
        tasks.create(NewTask::new("Learn c++ templates")).unwrap();

        assert_eq!(titles(ctx, "100%"), vec!["100% done checklist"]);
        for query in ["c++", "\"quoted\"", "AND", "NEAR(a b)", "a:b", "'; DROP TABLE tasks; --"] {
            assert!(Search::new(&ctx.db).run_as_of(query, 1, 10, today()).is_ok(), "query {:?} failed", query);
        }
        assert_eq!(Tasks::new(&ctx.db).fetch(weekplan::libs::task::TaskFilter::All).unwrap().len(), 2);
    }

    #[test_context(SearchTestContext)]
    #[test]
    fn test_pagination(ctx: &mut SearchTestContext) {
        let tasks = Tasks::new(&ctx.db);
        for day in 1..=5 {
            tasks.create(NewTask::new(&format!("Invoice {}", day)).due(date(2024, 6, day))).unwrap();
        }
        let search = Search::new(&ctx.db);

        let first = search.run_as_of("invoice", 1, 2, today()).unwrap();
        let second = search.run_as_of("invoice", 2, 2, today()).unwrap();
        let third = search.run_as_of("invoice", 3, 2, today()).unwrap();
        let beyond = search.run_as_of("invoice", 4, 2, today()).unwrap();

        assert_eq!(first.page, 1);
        assert_eq!(first.page_size, 2);
        let all: Vec<String> = [first.tasks, second.tasks, third.tasks]
            .into_iter()
            .flatten()
            .map(|t| t.title)
            .collect();
        assert_eq!(all, vec!["Invoice 5", "Invoice 4", "Invoice 3", "Invoice 2", "Invoice 1"]);
        assert!(beyond.tasks.is_empty());
    }

    #[test_context(SearchTestContext)]
    #[test]
    fn test_invalid_requests(ctx: &mut SearchTestContext) {
        let search = Search::new(&ctx.db);

        let err = search.run("   ", 1, 10).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "query required");
        assert!(search.run("report", 0, 10).unwrap_err().is_validation());
        assert!(search.run("report", 1, 0).unwrap_err().is_validation());
        assert!(search.run("report", 1, 101).unwrap_err().is_validation());
        assert!(search.run("report", 1, 100).unwrap().tasks.is_empty());
    }

    #[test_context(SearchTestContext)]
    #[test]
    fn test_index_follows_changes(ctx: &mut SearchTestContext) {
        let tasks = Tasks::new(&ctx.db);
        let task = tasks.create(NewTask::new("Book flights")).unwrap();
        assert_eq!(titles(ctx, "flights").len(), 1);

        tasks
            .update(task.id, &TaskPatch::from_json(&json!({"title": "Book hotel", "description": "near the venue"})).unwrap())
            .unwrap();
        assert!(titles(ctx, "flights").is_empty());
        assert_eq!(titles(ctx, "hotel"), vec!["Book hotel"]);
        assert_eq!(titles(ctx, "venue"), vec!["Book hotel"]);

        // Changes to other columns keep the entry intact.
        tasks.update(task.id, &TaskPatch::mark_completed()).unwrap();
        assert_eq!(titles(ctx, "hotel").len(), 1);

        tasks.delete(task.id).unwrap();
        assert!(titles(ctx, "hotel").is_empty());
    }
}
