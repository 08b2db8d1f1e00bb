use crate::{
    db::db::Db,
    libs::{config::Config, messages::Message, occurrences::catch_up_recurring_occurrences, task::DATE_FORMAT},
    msg_error, msg_info, msg_success, msg_warning,
};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::time::Duration;

/// Remembers the last observed calendar date.
#[derive(Debug)]
pub struct DateWatcher {
    last: NaiveDate,
}

impl DateWatcher {
    pub fn new(today: NaiveDate) -> Self {
        DateWatcher { last: today }
    }

    /// Records `today` and returns true when it differs from the previous date.
    pub fn observe(&mut self, today: NaiveDate) -> bool {
        if today == self.last {
            return false;
        }
        self.last = today;
        true
    }
}

/// Runs the catch-up once, then again every time the local date changes,
/// until interrupted.
pub async fn cmd(db: &Db, config: &Config) -> Result<()> {
    msg_info!(Message::WatchStarted(config.watch_interval));
    let mut watcher = DateWatcher::new(Local::now().date_naive());
    catch_up(db).await;

    let mut ticker = tokio::time::interval(Duration::from_secs(config.watch_interval));
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let today = Local::now().date_naive();
                if watcher.observe(today) {
                    msg_info!(Message::DateChanged(today.format(DATE_FORMAT).to_string()));
                    catch_up(db).await;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                msg_info!(Message::WatchStopped);
                break;
            }
        }
    }

    Ok(())
}

async fn catch_up(db: &Db) {
    let db = db.clone();
    match tokio::task::spawn_blocking(move || catch_up_recurring_occurrences(&db)).await {
        Ok(Ok(report)) => {
            for skipped in &report.skipped {
                msg_warning!(Message::CatchUpSkipped(skipped.task_id, skipped.error.to_string()));
            }
            msg_success!(Message::CatchUpSummary {
                examined: report.examined,
                created: report.created.len(),
                skipped: report.skipped.len(),
            });
        }
        Ok(Err(e)) => msg_error!(Message::CatchUpFailed(e.to_string())),
        Err(e) => msg_error!(Message::CatchUpFailed(e.to_string())),
    }
}
