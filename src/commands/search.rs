use crate::{
    db::{db::Db, search::Search},
    libs::{config::Config, messages::Message, view::View},
    msg_info, msg_print,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Words to look for; several words are matched as one phrase
    #[arg(required = true)]
    query: Vec<String>,
    #[arg(short, long, default_value_t = 1)]
    page: u32,
    /// Results per page (defaults to `search_page_size` from the configuration)
    #[arg(short = 's', long)]
    page_size: Option<u32>,
}

pub fn cmd(args: SearchArgs, db: &Db, config: &Config, json: bool) -> Result<()> {
    let query = args.query.join(" ");
    let page_size = args.page_size.unwrap_or(config.search_page_size);
    let results = Search::new(db).run(&query, args.page, page_size)?;

    if json {
        return View::json(&results);
    }
    if results.tasks.is_empty() {
        msg_info!(Message::NoSearchResults(query));
        return Ok(());
    }
    msg_print!(Message::SearchResultsHeader(query, results.page), true);
    View::tasks(&results.tasks)
}
