//! wikitrans CLI Binary
//!
//! Command-line interface for translating encyclopedia articles.

use anyhow::Context;
use clap::Parser;
use std::process;
use wikitrans::config::ConfigLoader;
use wikitrans::logging::init_logging;
use wikitrans::tooling::cli::{Cli, CliContext};

fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = ConfigLoader::load(cli.config.as_deref()).context("loading configuration")?;

    // Logging is best effort; the command still runs without it
    if let Err(e) = init_logging(Some(&cli.logging_config(&config.logging))) {
        eprintln!("Warning: {}", e);
    }

    let context = CliContext::new(config).context("opening session")?;
    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
