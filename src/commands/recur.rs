use crate::{
    db::db::Db,
    libs::{messages::Message, occurrences::catch_up_recurring_occurrences, view::View},
    msg_success, msg_warning,
};
use anyhow::Result;
use serde_json::json;

pub fn cmd(db: &Db, json: bool) -> Result<()> {
    let report = catch_up_recurring_occurrences(db)?;

    if json {
        let skipped: Vec<_> = report
            .skipped
            .iter()
            .map(|s| json!({ "task_id": s.task_id, "error": s.error.to_string() }))
            .collect();
        return View::json(&json!({
            "examined": report.examined,
            "created": report.created,
            "skipped": skipped,
        }));
    }

    for skipped in &report.skipped {
        msg_warning!(Message::CatchUpSkipped(skipped.task_id, skipped.error.to_string()));
    }
    msg_success!(Message::CatchUpSummary {
        examined: report.examined,
        created: report.created.len(),
        skipped: report.skipped.len(),
    });
    if !report.created.is_empty() {
        View::tasks(&report.created)?;
    }
    Ok(())
}
