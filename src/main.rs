use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use weekplan::commands::Cli;
use weekplan::libs::config::Config;
use weekplan::libs::error::PlannerError;
use weekplan::libs::messages::Message;
use weekplan::msg_error;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::read() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_level);

    match Cli::menu(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<PlannerError>() {
                Some(error) => {
                    tracing::debug!(error = ?error, "command failed");
                    msg_error!(Message::RequestFailed(error.code(), error.public_message(config.expose_internal_errors)));
                }
                None => eprintln!("{:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
