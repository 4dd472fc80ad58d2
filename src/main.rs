//! Voice note store command-line interface.
//!
//! Drives the store the way the mobile screens do: record (add), browse
//! (list, like, tag, delete) and detail (show, edit, share).

mod cli;

use clap::Parser;
use cli::{Cli, Exit};
use voicenotes_core::config::Config;
use voicenotes_core::logging;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return Exit::InvalidArguments.into();
        }
    };
    logging::init(if cli.verbose { "debug" } else { &config.log });

    match cli::run(cli, config).await {
        Ok(exit) => exit.into(),
        Err(e) => {
            eprintln!("error: {:#}", e);
            Exit::from_error(&e).into()
        }
    }
}
