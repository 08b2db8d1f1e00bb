use crate::{
    db::{db::Db, settings::Settings, tasks::{TaskUpdate, Tasks}},
    libs::{
        error::PlannerError,
        messages::Message,
        task::{parse_date, NewTask, OrderUpdate, TaskFilter, TaskPatch, DATE_FORMAT},
        view::View,
    },
    msg_bail_anyhow, msg_info, msg_print, msg_success, msg_warning,
};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};
use serde_json::{json, Value};

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    command: TaskCommand,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// Create a task
    Add {
        title: String,
        /// Due date (YYYY-MM-DD); without it the task goes to the inbox
        #[arg(short, long)]
        due: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long, default_value_t = 0)]
        order: i64,
        /// Repeat rule: daily, weekly, monthly or yearly
        #[arg(short, long)]
        repeat: Option<String>,
        /// Repeat every N periods
        #[arg(short, long, default_value_t = 1)]
        every: i64,
    },
    /// List tasks of a day, a date range, the inbox or everything
    List {
        /// A date (YYYY-MM-DD) or "inbox"
        #[arg(short, long)]
        date: Option<String>,
        #[arg(long, requires = "to")]
        from: Option<String>,
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
    /// Show one task
    Show { id: i64 },
    /// Apply a JSON patch, e.g. '{"title": "New title", "due_date": null}'
    Update { id: i64, patch: String },
    /// Mark a task as done
    Done { id: i64 },
    /// Delete a task
    Delete {
        id: i64,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Set task positions, e.g. `reorder 4=0 7=1`
    Reorder {
        #[arg(required = true, value_name = "ID=ORDER")]
        pairs: Vec<String>,
    },
}

pub fn cmd(args: TaskArgs, db: &Db, json: bool) -> Result<()> {
    let tasks = Tasks::new(db);

    match args.command {
        TaskCommand::Add {
            title,
            due,
            color,
            description,
            order,
            repeat,
            every,
        } => {
            let mut task = NewTask::new(&title).repeating(repeat.as_deref().unwrap_or_default(), every);
            task.due_date = due.as_deref().map(parse_date_arg).transpose()?;
            task.color = color.unwrap_or_default();
            task.description = description.unwrap_or_default();
            task.order = order;

            let created = tasks.create(task)?;
            if json {
                return View::json(&created);
            }
            msg_success!(Message::TaskCreated(created.id, created.title));
            Ok(())
        }
        TaskCommand::List { date, from, to } => {
            let filter = TaskFilter::from_params(date.as_deref(), from.as_deref(), to.as_deref())?;
            let found = tasks.fetch(filter)?;
            if json {
                return View::json(&found);
            }
            if found.is_empty() {
                msg_info!(Message::NoTasksFound);
                return Ok(());
            }
            msg_print!(Message::TasksHeader(filter_label(db, filter)?), true);
            View::tasks(&found)
        }
        TaskCommand::Show { id } => {
            let task = tasks.get(id)?;
            if json {
                return View::json(&task);
            }
            View::task(&task)
        }
        TaskCommand::Update { id, patch } => {
            let body: Value = serde_json::from_str(&patch).map_err(|_| PlannerError::validation("Invalid request body format"))?;
            let patch = TaskPatch::from_json(&body)?;
            let outcome = tasks.update(id, &patch)?;
            report_update(Message::TaskUpdated(id), outcome, json)
        }
        TaskCommand::Done { id } => {
            let outcome = tasks.update(id, &TaskPatch::mark_completed())?;
            report_update(Message::TaskCompleted(id), outcome, json)
        }
        TaskCommand::Delete { id, yes } => {
            let task = tasks.get(id)?;
            if !yes {
                let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(Message::ConfirmDeleteTask(task.id, task.title.clone()).to_string())
                    .default(false)
                    .interact()?;
                if !confirmed {
                    msg_info!(Message::OperationCancelled);
                    return Ok(());
                }
            }
            tasks.delete(id)?;
            msg_success!(Message::TaskDeleted(id));
            Ok(())
        }
        TaskCommand::Reorder { pairs } => {
            let updates = pairs.iter().map(|pair| parse_order_pair(pair)).collect::<Result<Vec<_>>>()?;
            tasks.bulk_update_order(&updates)?;
            msg_success!(Message::TaskOrderUpdated(updates.len()));
            Ok(())
        }
    }
}

fn report_update(message: Message, outcome: TaskUpdate, json: bool) -> Result<()> {
    if json {
        return View::json(&json!({
            "task": outcome.task,
            "next_occurrence": outcome.next_occurrence,
            "recurrence_error": outcome.recurrence_error.map(|e| e.to_string()),
        }));
    }

    msg_success!(message);
    if let Some(next) = &outcome.next_occurrence {
        msg_info!(Message::NextOccurrenceCreated(next.id, next.due_date_label()));
    }
    if let Some(error) = &outcome.recurrence_error {
        msg_warning!(Message::NextOccurrenceFailed(error.to_string()));
    }
    Ok(())
}

fn filter_label(db: &Db, filter: TaskFilter) -> Result<String> {
    Ok(match filter {
        TaskFilter::All => "all".to_string(),
        TaskFilter::Inbox => Settings::new(db).get_inbox_title()?,
        TaskFilter::Day(day) => day.format(DATE_FORMAT).to_string(),
        TaskFilter::Range(start, end) => format!("{} .. {}", start.format(DATE_FORMAT), end.format(DATE_FORMAT)),
    })
}

fn parse_date_arg(value: &str) -> Result<NaiveDate> {
    match parse_date(value) {
        Ok(date) => Ok(date),
        Err(_) => msg_bail_anyhow!(Message::InvalidDateArgument(value.to_string())),
    }
}

fn parse_order_pair(pair: &str) -> Result<OrderUpdate> {
    let parsed = pair
        .split_once('=')
        .and_then(|(id, order)| Some(OrderUpdate { id: id.trim().parse().ok()?, order: order.trim().parse().ok()? }));
    match parsed {
        Some(update) => Ok(update),
        None => msg_bail_anyhow!(Message::InvalidOrderPair(pair.to_string())),
    }
}
