use super::config::Config;
use super::task::Task;
use anyhow::Result;
use prettytable::{row, Table};
use serde::Serialize;

pub struct View {}

impl View {
    pub fn tasks(tasks: &[Task]) -> Result<()> {
        Self::tasks_table(tasks).printstd();
        Ok(())
    }

    pub fn tasks_table(tasks: &[Task]) -> Table {
        let mut table = Table::new();

        table.add_row(row!["ID", "TITLE", "DUE", "DONE", "ORDER", "REPEAT", "COLOR"]);
        for task in tasks {
            table.add_row(row![
                task.id,
                task.title,
                task.due_date_label(),
                if task.completed { "✔" } else { "" },
                task.order,
                repeat_label(task),
                task.color
            ]);
        }
        table
    }

    /// Single task with its description.
    pub fn task(task: &Task) -> Result<()> {
        let mut table = Self::tasks_table(std::slice::from_ref(task));
        if !task.description.is_empty() {
            table.add_row(row!["", H6->task.description]);
        }
        table.printstd();
        Ok(())
    }

    pub fn config(config: &Config) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["KEY", "VALUE"]);
        table.add_row(row![
            "db_path",
            config.db_path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(default)".to_string())
        ]);
        table.add_row(row!["log_level", config.log_level]);
        table.add_row(row!["watch_interval", config.watch_interval]);
        table.add_row(row!["search_page_size", config.search_page_size]);
        table.add_row(row!["expose_internal_errors", config.expose_internal_errors]);
        table.printstd();
        Ok(())
    }

    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

fn repeat_label(task: &Task) -> String {
    match (task.recurrence_rule.as_str(), task.recurrence_interval) {
        ("", _) => String::new(),
        (rule, 1) => rule.to_string(),
        (rule, interval) => format!("{} x{}", rule, interval),
    }
}
