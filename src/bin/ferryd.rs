#![deny(unsafe_code)]

//! Entry point for the `ferryd` file-transfer daemon.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use ferry_daemon::cli::Cli;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_config();
    match ferry_daemon::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "daemon failed");
            ExitCode::FAILURE
        }
    }
}
