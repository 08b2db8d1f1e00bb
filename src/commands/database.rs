use crate::{
    db::db::Db,
    libs::messages::Message,
    msg_info, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DbArgs {
    #[command(subcommand)]
    command: DbCommand,
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Write a snapshot of the database to a new file
    Export { path: PathBuf },
    /// Replace the database with the contents of a file
    Import {
        path: PathBuf,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the database location
    Path,
}

pub fn cmd(args: DbArgs, db: &Db) -> Result<()> {
    match args.command {
        DbCommand::Export { path } => {
            db.export_to(&path)?;
            msg_success!(Message::DatabaseExported(path.display().to_string()));
        }
        DbCommand::Import { path, yes } => {
            if !yes {
                let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(Message::ConfirmImport(path.display().to_string()).to_string())
                    .default(false)
                    .interact()?;
                if !confirmed {
                    msg_info!(Message::OperationCancelled);
                    return Ok(());
                }
            }
            db.import_from(&path)?;
            msg_success!(Message::DatabaseImported(path.display().to_string()));
        }
        DbCommand::Path => {
            let path = db.path().map(|p| p.display().to_string()).unwrap_or_else(|| ":memory:".to_string());
            msg_info!(Message::DatabasePath(path));
        }
    }
    Ok(())
}
