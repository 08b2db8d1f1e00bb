use crate::{
    db::{db::Db, settings::Settings},
    libs::{messages::Message, view::View},
    msg_print, msg_success,
};
use anyhow::Result;
use clap::Args;
use serde_json::json;

#[derive(Debug, Args)]
pub struct InboxArgs {
    /// New inbox title
    #[arg(short, long)]
    title: Option<String>,
}

pub fn cmd(args: InboxArgs, db: &Db, json: bool) -> Result<()> {
    let settings = Settings::new(db);

    if let Some(title) = args.title {
        settings.update_inbox_title(&title)?;
        msg_success!(Message::InboxTitleUpdated(title));
        return Ok(());
    }

    let title = settings.get_inbox_title()?;
    if json {
        return View::json(&json!({ "inbox_title": title }));
    }
    msg_print!(Message::InboxTitle(title));
    Ok(())
}
