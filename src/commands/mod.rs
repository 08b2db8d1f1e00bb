pub mod config;
pub mod database;
pub mod inbox;
#[cfg(debug_assertions)]
pub mod migrations;
pub mod recur;
pub mod search;
pub mod task;
pub mod watch;

use crate::db::db::Db;
use crate::libs::config::Config;
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Create, list and change tasks")]
    Task(task::TaskArgs),
    #[command(about = "Full-text search over task titles and descriptions")]
    Search(search::SearchArgs),
    #[command(about = "Show or rename the inbox")]
    Inbox(inbox::InboxArgs),
    #[command(about = "Create next occurrences of overdue recurring tasks")]
    Recur,
    #[command(about = "Catch up recurring tasks whenever the date changes")]
    Watch,
    #[command(about = "Export or import the database file")]
    Db(database::DbArgs),
    #[cfg(debug_assertions)]
    #[command(about = "Database migration status (debug builds)")]
    Migrations(migrations::MigrationsArgs),
    #[command(about = "Show or edit configuration")]
    Config(config::ConfigArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu(config: &Config) -> Result<()> {
        Self::parse().run(config).await
    }

    pub async fn run(self, config: &Config) -> Result<()> {
        let json = self.json;
        match self.command {
            Commands::Task(args) => task::cmd(args, &Db::from_config(config)?, json),
            Commands::Search(args) => search::cmd(args, &Db::from_config(config)?, config, json),
            Commands::Inbox(args) => inbox::cmd(args, &Db::from_config(config)?, json),
            Commands::Recur => recur::cmd(&Db::from_config(config)?, json),
            Commands::Watch => watch::cmd(&Db::from_config(config)?, config).await,
            Commands::Db(args) => database::cmd(args, &Db::from_config(config)?),
            #[cfg(debug_assertions)]
            Commands::Migrations(args) => migrations::cmd(args, config),
            Commands::Config(args) => config::cmd(args, config, json),
        }
    }
}
