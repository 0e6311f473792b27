//! InkForge entry point: parse arguments, load configuration, initialize
//! logging, dispatch to the selected subcommand.

mod ai_service;
mod cli;
mod config;
mod errors;
mod formatters;
mod generator;
mod models;
mod parser;
mod processors;
mod prompts;
mod quality;
mod session;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            config.debug |= cli.debug;
            config
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(config.debug);

    if let Err(e) = cli.run(config).await {
        error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default_directive = if debug { "inkforge=debug" } else { "inkforge=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
