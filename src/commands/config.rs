use crate::{
    libs::{config::Config, messages::Message, view::View},
    msg_print, msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Print the effective configuration instead of editing it
    #[arg(short, long)]
    show: bool,
}

/// Shows the effective configuration or runs the interactive editor.
pub fn cmd(args: ConfigArgs, config: &Config, json: bool) -> Result<()> {
    if args.show {
        if json {
            return View::json(config);
        }
        msg_print!(Message::ConfigHeader, true);
        return View::config(config);
    }

    Config::init()?.save()?;
    msg_success!(Message::ConfigSaved);
    Ok(())
}
