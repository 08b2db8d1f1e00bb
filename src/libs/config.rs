//! Configuration management for weekplan.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults;
//! 2. `config.json` in the platform data directory (see [`DataStorage`]);
//! 3. environment variables, optionally loaded from a `.env` file.
//!
//! ## Environment variables
//!
//! | variable | field |
//! |---|---|
//! | `WEEKPLAN_DB` | `db_path` |
//! | `WEEKPLAN_LOG` | `log_level` |
//! | `WEEKPLAN_WATCH_INTERVAL` | `watch_interval` |
//! | `WEEKPLAN_EXPOSE_ERRORS` | `expose_internal_errors` |
//!
//! ```rust,no_run
//! use weekplan::libs::config::Config;
//!
//! let mut config = Config::read()?;
//! config.watch_interval = 30;
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::db::search::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::libs::messages::Message;
use crate::msg_error_anyhow;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const ENV_DB: &str = "WEEKPLAN_DB";
pub const ENV_LOG: &str = "WEEKPLAN_LOG";
pub const ENV_WATCH_INTERVAL: &str = "WEEKPLAN_WATCH_INTERVAL";
pub const ENV_EXPOSE_ERRORS: &str = "WEEKPLAN_EXPOSE_ERRORS";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Database file; the data directory's `tasks.db` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// Default tracing filter, used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Seconds between date-change checks in `watch`.
    pub watch_interval: u64,

    pub search_page_size: u32,

    /// Include storage error details in messages shown to users.
    pub expose_internal_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: None,
            log_level: "error".to_string(),
            watch_interval: 60,
            search_page_size: DEFAULT_PAGE_SIZE,
            expose_internal_errors: true,
        }
    }
}

impl Config {
    /// Loads the effective configuration: file, then `.env`, then environment.
    pub fn read() -> Result<Config> {
        let mut config = Self::read_file()?;
        dotenv::dotenv().ok();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Configuration stored in `config.json`, or defaults when there is none.
    pub fn read_file() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(&config_file_path)?;
        let config: Config =
            serde_json::from_str(&config_str).map_err(|e| msg_error_anyhow!(Message::ConfigParseError(e.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Overrides fields from the variables `lookup` resolves.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB).filter(|v| !v.is_empty()) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_level = level.to_lowercase();
        }
        if let Some(interval) = lookup(ENV_WATCH_INTERVAL).filter(|v| !v.is_empty()) {
            self.watch_interval = interval
                .trim()
                .parse()
                .map_err(|_| msg_error_anyhow!(Message::ConfigInvalidValue(ENV_WATCH_INTERVAL.to_string(), interval.clone())))?;
        }
        if let Some(flag) = lookup(ENV_EXPOSE_ERRORS).filter(|v| !v.is_empty()) {
            self.expose_internal_errors = parse_flag(&flag)
                .ok_or_else(|| msg_error_anyhow!(Message::ConfigInvalidValue(ENV_EXPOSE_ERRORS.to_string(), flag.clone())))?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(msg_error_anyhow!(Message::ConfigInvalidValue("log_level".to_string(), self.log_level.clone())));
        }
        if self.watch_interval == 0 {
            return Err(msg_error_anyhow!(Message::ConfigInvalidValue(
                "watch_interval".to_string(),
                self.watch_interval.to_string()
            )));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.search_page_size) {
            return Err(msg_error_anyhow!(Message::ConfigInvalidValue(
                "search_page_size".to_string(),
                self.search_page_size.to_string()
            )));
        }
        Ok(())
    }

    /// Interactive setup, prefilled with the current values.
    pub fn init() -> Result<Self> {
        let current = Self::read_file().unwrap_or_default();
        let theme = ColorfulTheme::default();

        let db_path: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptDbPath.to_string())
            .default(current.db_path.as_ref().map(|p| p.display().to_string()).unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;

        let log_level: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptLogLevel.to_string())
            .default(current.log_level.clone())
            .validate_with(|input: &String| -> Result<(), String> {
                if LOG_LEVELS.contains(&input.as_str()) {
                    Ok(())
                } else {
                    Err(Message::ConfigInvalidValue("log_level".to_string(), input.clone()).to_string())
                }
            })
            .interact_text()?;

        let watch_interval: u64 = Input::with_theme(&theme)
            .with_prompt(Message::PromptWatchInterval.to_string())
            .default(current.watch_interval)
            .interact_text()?;

        let search_page_size: u32 = Input::with_theme(&theme)
            .with_prompt(Message::PromptSearchPageSize.to_string())
            .default(current.search_page_size)
            .interact_text()?;

        let config = Config {
            db_path: Some(db_path).filter(|p| !p.trim().is_empty()).map(PathBuf::from),
            log_level,
            watch_interval,
            search_page_size,
            expose_internal_errors: current.expose_internal_errors,
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
