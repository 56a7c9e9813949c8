use std::process::ExitCode;

use clap::Parser;
use config::Config;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod config;
mod transfer;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::parse();

    match transfer::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("transfer failed: {e}");
            ExitCode::FAILURE
        }
    }
}
