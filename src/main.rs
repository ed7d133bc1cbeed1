//! jiraby - JIRA from the command line.

mod cli;

use std::process::ExitCode;

use clap::Parser;

use jiraby::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::Args::parse();

    if let Err(e) = logging::init() {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    match cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            eprintln!("error: {}", e.user_message());
            if let Some(action) = e.suggested_action() {
                eprintln!("hint: {}", action);
            }
            ExitCode::FAILURE
        }
    }
}
